//! # Kernel runtime core
//!
//! The process table, scheduler, kernel heap, console, log ring and the
//! API facade handed to every program — the whole runtime, runnable on
//! the host.
//!
//! ## Philosophy
//!
//! **The kernel is a deterministic state machine, not a pile of
//! interrupt handlers.**
//!
//! Programs are async functions; every blocking API call is a future
//! that parks its task in the process table, and the dispatcher is a
//! plain round-robin loop polling ready tasks with a no-op waker. Timer
//! interrupts become tick accounting on the dispatch path, and "waiting
//! for hardware" becomes a wake-condition check against the simulated
//! devices. The same script of inputs always produces the same schedule,
//! the same console, the same log.
//!
//! ## Design Principles
//!
//! 1. **One cell**: all kernel state lives in a single `Rc<RefCell<..>>`
//!    shared by the dispatcher and every task's [`Api`] handle
//! 2. **Tasks never outlive the table**: a slot transitions
//!    `Free → Ready → Running → Blocked/Zombie → Free` and the future is
//!    dropped the moment the slot leaves the live states
//! 3. **Devices stay behind the HAL**: the core holds `Box<dyn ...>`
//!    collaborators and never downcasts

pub mod api;
pub mod config;
pub mod console;
pub mod futures;
pub mod heap;
pub mod klog;
pub mod loader;
pub mod process;
pub mod snapshot;
pub mod stdio;
pub mod test_utils;

pub use api::Api;
pub use config::KernelConfig;
pub use console::Console;
pub use heap::{HeapPtr, KernelHeap};
pub use klog::{Klog, LogLevel};
pub use loader::{program, ProgramEntry, ProgramRegistry};
pub use process::{BlockReason, ProcessTable, ScheduleEvent};
pub use snapshot::{ProcessInfo, SystemSnapshot};
pub use stdio::StdioStack;

use core_types::{Pid, ProcessState, MAX_PROCESSES};
use framebuffer::Framebuffer;
use hal::{
    CpuInfo, DmaEngine, FixedRtc, KeyboardDevice, LedDevice, LoopbackNet, MouseDevice,
    NetworkStack, RamVfs, RtcDevice, ScriptedKeyboard, SimCpu, SimDma, SimLed, SimMouse,
    SimSound, SimUsbBus, SoundDevice, UsbBus, Vfs,
};
use kernel_api::{FtpServer, KernelError, TtfEngine, WifiRadio, WinExecHost, WindowServer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll};

/// One open-file-table entry: a path plus a cursor.
pub(crate) struct OpenFile {
    pub path: String,
    pub pos: usize,
}

/// The device complement the kernel boots with. Every field defaults to
/// the simulated implementation; tests swap in shared handles
/// (`Rc<RefCell<ScriptedKeyboard>>` and friends) where they need to keep
/// feeding a device the kernel owns.
pub struct Devices {
    pub vfs: Box<dyn Vfs>,
    pub rtc: Box<dyn RtcDevice>,
    pub keyboard: Box<dyn KeyboardDevice>,
    pub mouse: Box<dyn MouseDevice>,
    pub dma: Box<dyn DmaEngine>,
    pub sound: Box<dyn SoundDevice>,
    pub net: Box<dyn NetworkStack>,
    pub led: Box<dyn LedDevice>,
    pub cpu: Box<dyn CpuInfo>,
    pub usb: Box<dyn UsbBus>,
}

impl Default for Devices {
    fn default() -> Self {
        Self {
            vfs: Box::new(RamVfs::new()),
            rtc: Box::new(FixedRtc::default()),
            keyboard: Box::new(ScriptedKeyboard::new()),
            mouse: Box::new(SimMouse::new()),
            dma: Box::new(SimDma::new()),
            sound: Box::new(SimSound::new()),
            net: Box::new(LoopbackNet::new()),
            led: Box::new(SimLed::new()),
            cpu: Box::new(SimCpu::new()),
            usb: Box::new(SimUsbBus::new()),
        }
    }
}

/// Everything behind the cell. Fields are crate-visible; the outside
/// world goes through [`Kernel`] and [`Api`].
pub(crate) struct KernelState {
    pub config: KernelConfig,
    pub ticks: u64,
    pub rtc_base: u64,
    pub heap: KernelHeap,
    pub procs: ProcessTable,
    pub klog: Klog,
    pub console: Console,
    pub fb: Framebuffer,
    pub stdio: StdioStack,
    pub registry: ProgramRegistry,
    pub window_server: Option<Rc<RefCell<dyn WindowServer>>>,
    pub ttf: Option<Rc<RefCell<dyn TtfEngine>>>,
    pub winexec: Option<Rc<RefCell<dyn WinExecHost>>>,
    pub ftp: Option<Rc<RefCell<dyn FtpServer>>>,
    pub wifi: Option<Rc<RefCell<dyn WifiRadio>>>,
    pub fds: HashMap<core_types::Fd, OpenFile>,
    pub next_fd: u32,
    pub cwd: String,
    pub uart: String,
    /// In-flight task bodies, keyed by pid index. A future is removed
    /// while being polled and only reinserted if the slot is still live.
    pub futures: HashMap<usize, ::futures::future::LocalBoxFuture<'static, i32>>,
    pub vfs: Box<dyn Vfs>,
    pub keyboard: Box<dyn KeyboardDevice>,
    pub mouse: Box<dyn MouseDevice>,
    pub dma: Box<dyn DmaEngine>,
    pub sound: Box<dyn SoundDevice>,
    pub net: Box<dyn NetworkStack>,
    pub led: Box<dyn LedDevice>,
    pub cpu: Box<dyn CpuInfo>,
    pub usb: Box<dyn UsbBus>,
}

impl KernelState {
    /// Absolute, normalized form of `path` relative to the working
    /// directory. `.` and `..` collapse; the result always starts at `/`.
    pub(crate) fn resolve_path(&self, path: &str) -> String {
        let joined = if path.starts_with('/') {
            path.to_string()
        } else if self.cwd == "/" {
            format!("/{path}")
        } else {
            format!("{}/{}", self.cwd, path)
        };
        let mut parts: Vec<&str> = Vec::new();
        for seg in joined.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                s => parts.push(s),
            }
        }
        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        }
    }

    pub(crate) fn snapshot(&self) -> SystemSnapshot {
        let processes = (0..MAX_PROCESSES)
            .filter_map(|i| {
                let slot = self.procs.by_index(i)?;
                if slot.state == ProcessState::Free {
                    return None;
                }
                Some(ProcessInfo {
                    name: slot.name.clone(),
                    state: slot.state,
                    parent: slot.parent.index(),
                    exit_code: slot.exit_code,
                })
            })
            .collect();
        SystemSnapshot {
            uptime_ticks: self.ticks,
            mem_used: self.heap.used() as u64,
            mem_free: self.heap.free_bytes() as u64,
            alloc_count: self.heap.alloc_count(),
            process_count: self.procs.count_live(),
            processes,
        }
    }
}

/// Advances the clock, driving the devices that consume ticks.
fn advance(st: &mut KernelState, ticks: u64) {
    for _ in 0..ticks {
        st.ticks += 1;
        st.sound.on_tick();
    }
}

/// Reaps zombie children of a departed parent and hands live ones to the
/// root task.
fn sweep_orphans(st: &mut KernelState, parent: Pid) {
    let tick = st.ticks;
    for child in st.procs.children_of(parent) {
        if st.procs.state(child) == ProcessState::Zombie {
            if let Some((_, allocs)) = st.procs.reap(child, tick) {
                for ptr in allocs {
                    st.heap.free(ptr);
                }
            }
            st.futures.remove(&child.index());
        } else if let Some(slot) = st.procs.slot_mut(child) {
            slot.parent = Pid::ROOT;
        }
    }
}

/// Creates a task: resolves the program, claims a slot, copies argv into
/// child-owned heap blocks and parks the entry future for dispatch.
/// Failures roll back everything already claimed.
pub(crate) fn spawn_internal(
    state: &Rc<RefCell<KernelState>>,
    parent: Pid,
    path: &str,
    args: &[&str],
) -> Result<Pid, KernelError> {
    let st = &mut *state.borrow_mut();
    let path = st.resolve_path(path);
    let entry = st
        .registry
        .resolve(&path)
        .ok_or_else(|| KernelError::NotFound(path.clone()))?;
    let tick = st.ticks;
    let name = path.rsplit('/').next().unwrap_or(path.as_str());
    let pid = st
        .procs
        .allocate(name, parent, tick)
        .ok_or(KernelError::OutOfSlots("process table"))?;

    let mut argv = vec![path.clone()];
    argv.extend(args.iter().map(|s| s.to_string()));
    let mut allocs = Vec::with_capacity(argv.len());
    for arg in &argv {
        match st.heap.alloc(arg.len() + 1) {
            Some(ptr) => {
                let mut bytes = arg.clone().into_bytes();
                bytes.push(0);
                st.heap.write_bytes(ptr, &bytes);
                allocs.push(ptr);
            }
            None => {
                for ptr in allocs {
                    st.heap.free(ptr);
                }
                if let Some(slot) = st.procs.slot_mut(pid) {
                    slot.state = ProcessState::Free;
                    slot.name.clear();
                }
                return Err(KernelError::OutOfMemory);
            }
        }
    }
    if let Some(slot) = st.procs.slot_mut(pid) {
        slot.argv_allocs = allocs;
    }
    st.klog
        .log(LogLevel::Info, &format!("spawn {} pid={}", path, pid.index()));
    let fut = entry(Api::new(state.clone(), pid), argv);
    st.futures.insert(pid.index(), fut);
    Ok(pid)
}

/// Terminates a running task with exit code −1. Its future is dropped,
/// its windows close, its orphans are handed off. The slot stays `Zombie`
/// until the parent collects it. A task that already exited is not
/// killable; the call reports failure and records nothing.
pub(crate) fn kill_internal(state: &Rc<RefCell<KernelState>>, pid: Pid) -> bool {
    let ws = {
        let st = &mut *state.borrow_mut();
        match st.procs.state(pid) {
            ProcessState::Free | ProcessState::Zombie => return false,
            _ => {}
        }
        let tick = st.ticks;
        st.procs.mark_zombie(pid, -1, tick, true);
        st.futures.remove(&pid.index());
        st.klog
            .log(LogLevel::Warn, &format!("pid={} killed", pid.index()));
        sweep_orphans(st, pid);
        st.window_server.clone()
    };
    if let Some(ws) = ws {
        ws.borrow_mut().close_owned_by(pid);
    }
    true
}

/// The kernel: a handle over the shared state cell plus the dispatch
/// loop. Single-threaded by construction.
pub struct Kernel {
    state: Rc<RefCell<KernelState>>,
}

impl Kernel {
    pub fn new(config: KernelConfig, devices: Devices) -> Self {
        let fb = if config.fb_double_buffer {
            Framebuffer::new_double_buffered(config.fb_width, config.fb_height)
        } else {
            Framebuffer::new(config.fb_width, config.fb_height)
        };
        let state = KernelState {
            heap: KernelHeap::new(config.heap_size),
            procs: ProcessTable::new(),
            klog: Klog::new(config.klog_capacity),
            console: Console::new(config.fb_width, config.fb_height),
            fb,
            stdio: StdioStack::new(),
            registry: ProgramRegistry::new(),
            window_server: None,
            ttf: None,
            winexec: None,
            ftp: None,
            wifi: None,
            fds: HashMap::new(),
            next_fd: 3, // 0..2 reserved by convention
            cwd: "/".to_string(),
            uart: String::new(),
            futures: HashMap::new(),
            ticks: 0,
            rtc_base: devices.rtc.timestamp(),
            config,
            vfs: devices.vfs,
            keyboard: devices.keyboard,
            mouse: devices.mouse,
            dma: devices.dma,
            sound: devices.sound,
            net: devices.net,
            led: devices.led,
            cpu: devices.cpu,
            usb: devices.usb,
        };
        let kernel = Self {
            state: Rc::new(RefCell::new(state)),
        };
        kernel
            .state
            .borrow_mut()
            .klog
            .log(LogLevel::Info, "kernel up");
        kernel
    }

    /// Registers an entry point under an absolute path and makes the path
    /// visible in the filesystem so listings and the loader agree.
    pub fn register_program(&self, path: &str, entry: ProgramEntry) {
        let st = &mut *self.state.borrow_mut();
        st.registry.register(path, entry);
        if !st.vfs.exists(path) {
            let _ = st.vfs.create(path);
        }
    }

    /// Registers the desktop's window server; windowing calls return their
    /// sentinel until this happens.
    pub fn install_window_server(&self, server: Rc<RefCell<dyn WindowServer>>) {
        self.state.borrow_mut().window_server = Some(server);
    }

    /// Registers a TrueType engine; `ttf_*` calls degrade until then.
    pub fn install_ttf_engine(&self, engine: Rc<RefCell<dyn TtfEngine>>) {
        self.state.borrow_mut().ttf = Some(engine);
    }

    /// Registers a Windows-executable host; `winexec_*` calls degrade
    /// until then.
    pub fn install_winexec_host(&self, host: Rc<RefCell<dyn WinExecHost>>) {
        self.state.borrow_mut().winexec = Some(host);
    }

    /// Registers an FTP server; `ftp_*` calls degrade until then.
    pub fn install_ftp_server(&self, server: Rc<RefCell<dyn FtpServer>>) {
        self.state.borrow_mut().ftp = Some(server);
    }

    /// Registers the WiFi radio; `wifi_*` calls degrade until then.
    pub fn install_wifi_radio(&self, radio: Rc<RefCell<dyn WifiRadio>>) {
        self.state.borrow_mut().wifi = Some(radio);
    }

    /// Spawns a top-level task (parented to the root slot).
    pub fn spawn(&self, path: &str, args: &[&str]) -> Result<Pid, KernelError> {
        spawn_internal(&self.state, Pid::ROOT, path, args)
    }

    /// Runs the dispatch loop until no task is runnable and no wake can be
    /// simulated forward. Returns the number of dispatches performed.
    pub fn run_until_idle(&self) -> usize {
        self.run_steps(usize::MAX)
    }

    /// Bounded variant of [`Kernel::run_until_idle`] for tests that want a
    /// ceiling on scheduler progress.
    pub fn run_steps(&self, max: usize) -> usize {
        let mut dispatched = 0;
        while dispatched < max {
            self.wake_blocked();
            let next = self.state.borrow_mut().procs.pick_next_ready();
            match next {
                Some(pid) => {
                    self.dispatch(pid);
                    dispatched += 1;
                }
                None => {
                    if !self.advance_idle() {
                        break;
                    }
                }
            }
        }
        dispatched
    }

    /// Flips every blocked task whose wake condition holds back to ready.
    /// This is the only wake path in the system.
    fn wake_blocked(&self) {
        let st = &mut *self.state.borrow_mut();
        let hook = st.stdio.active();
        let mut to_wake = Vec::new();
        for i in 0..MAX_PROCESSES {
            let Some(slot) = st.procs.by_index(i) else {
                continue;
            };
            if slot.state != ProcessState::Blocked {
                continue;
            }
            let ready = match slot.blocked_on {
                Some(BlockReason::SleepUntil(t)) => st.ticks >= t.0,
                Some(BlockReason::Input) => match &hook {
                    Some(h) => h.borrow().has_key(),
                    None => st.keyboard.has_key(),
                },
                Some(BlockReason::ChildExit(c)) => matches!(
                    st.procs.state(c),
                    ProcessState::Zombie | ProcessState::Free
                ),
                Some(BlockReason::Sound) => !st.sound.is_playing(),
                Some(BlockReason::NetRecv(s)) => {
                    st.net.has_data(s)
                        || !(st.net.tcp_is_connected(s) || st.net.tls_is_connected(s))
                }
                None => false,
            };
            if ready {
                to_wake.push(Pid(i));
            }
        }
        let tick = st.ticks;
        for pid in to_wake {
            st.procs.wake(pid, tick);
        }
    }

    /// Polls one task for one quantum.
    fn dispatch(&self, pid: Pid) {
        let mut fut = {
            let st = &mut *self.state.borrow_mut();
            let tick = st.ticks;
            st.procs.mark_running(pid, tick);
            match st.futures.remove(&pid.index()) {
                Some(f) => f,
                None => {
                    // A ready slot with no body cannot run again.
                    st.procs.mark_zombie(pid, -1, tick, false);
                    return;
                }
            }
        };
        let waker = ::futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(code) => {
                drop(fut);
                self.task_exit(pid, code);
            }
            Poll::Pending => {
                let st = &mut *self.state.borrow_mut();
                match st.procs.state(pid) {
                    // Killed during its own poll; the body dies here.
                    ProcessState::Zombie | ProcessState::Free => {}
                    // Pending without blocking is a voluntary yield.
                    ProcessState::Running => {
                        st.procs.mark_ready(pid);
                        st.futures.insert(pid.index(), fut);
                    }
                    _ => {
                        st.futures.insert(pid.index(), fut);
                    }
                }
            }
        }
        let st = &mut *self.state.borrow_mut();
        if st.procs.current == Some(pid) {
            st.procs.current = None;
        }
        let quantum = st.config.quantum_ticks;
        advance(st, quantum);
    }

    /// Normal task exit: zombie transition, window teardown, orphan
    /// handoff. The parent's `exec` wait collects the slot.
    fn task_exit(&self, pid: Pid, code: i32) {
        let ws = {
            let st = &mut *self.state.borrow_mut();
            let tick = st.ticks;
            st.procs.mark_zombie(pid, code, tick, false);
            st.klog.log(
                LogLevel::Info,
                &format!("pid={} exit code={}", pid.index(), code),
            );
            sweep_orphans(st, pid);
            st.window_server.clone()
        };
        if let Some(ws) = ws {
            ws.borrow_mut().close_owned_by(pid);
        }
    }

    /// When nothing is runnable, jumps the clock to the next timer wake,
    /// or ticks through active playback. False when no amount of simulated
    /// time can unblock anyone.
    fn advance_idle(&self) -> bool {
        let st = &mut *self.state.borrow_mut();
        let mut next_wake: Option<u64> = None;
        let mut sound_wait = false;
        for i in 0..MAX_PROCESSES {
            let Some(slot) = st.procs.by_index(i) else {
                continue;
            };
            if slot.state != ProcessState::Blocked {
                continue;
            }
            match slot.blocked_on {
                Some(BlockReason::SleepUntil(t)) => {
                    next_wake = Some(next_wake.map_or(t.0, |w| w.min(t.0)));
                }
                Some(BlockReason::Sound) => sound_wait = true,
                _ => {}
            }
        }
        if let Some(wake) = next_wake {
            let delta = wake.saturating_sub(st.ticks);
            advance(st, delta);
            true
        } else if sound_wait && st.sound.is_playing() && !st.sound.is_paused() {
            advance(st, 1);
            true
        } else {
            false
        }
    }

    // ---- Observation surface (tests, the monitor, demos) -------------

    /// An API handle bound to `pid`, as a program running in that slot
    /// would hold.
    pub fn api_for(&self, pid: Pid) -> Api {
        Api::new(self.state.clone(), pid)
    }

    pub fn uptime_ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    pub fn process_state(&self, pid: Pid) -> ProcessState {
        self.state.borrow().procs.state(pid)
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        self.state.borrow().snapshot()
    }

    /// Scheduling audit trail since boot.
    pub fn schedule_events(&self) -> Vec<ScheduleEvent> {
        self.state.borrow().procs.events.clone()
    }

    /// One console row as trimmed text.
    pub fn console_line(&self, row: usize) -> String {
        self.state.borrow().console.line(row)
    }

    /// Everything the kernel log currently retains.
    pub fn klog_contents(&self) -> String {
        self.state.borrow().klog.contents()
    }

    /// The UART transcript (panic banners, early boot output).
    pub fn uart_output(&self) -> String {
        self.state.borrow().uart.clone()
    }

    /// Renders the console cell grid into the framebuffer.
    pub fn render_console(&self) {
        let st = &mut *self.state.borrow_mut();
        let KernelState { console, fb, .. } = st;
        console.render(fb);
    }

    pub fn framebuffer_pixel(&self, x: usize, y: usize) -> core_types::Pixel {
        self.state.borrow().fb.pixel(x, y)
    }

    /// A copy of the visible plane, for frame comparisons.
    pub fn framebuffer_snapshot(&self) -> Vec<u32> {
        self.state.borrow().fb.visible_pixels().to_vec()
    }
}
