//! The kernel API facade
//!
//! The Rust rendering of the single indirection table every program is
//! handed at entry. One [`Api`] value exists per task (shared kernel handle
//! plus the owning pid); all operations run synchronously on the caller's
//! task, and the blocking ones return futures that suspend through the
//! scheduler.
//!
//! Optional capabilities (window server, stdio hooks, TTF, winexec, FTP,
//! WiFi) degrade to their sentinel (`None` / false / 0 / −1, or
//! fall-through to the raw console) until their collaborator registers —
//! the typed equivalent of the original nullable function pointers.

use crate::futures::{ExecWait, Getc, NetRecv, Sleep, SoundDone, YieldNow};
use crate::heap::HeapPtr;
use crate::klog::LogLevel;
use crate::snapshot::{ProcessInfo, SystemSnapshot};
use crate::{spawn_internal, KernelState};
use core_types::{Fd, Pid, Pixel, ProcessState, WindowEvent, WindowId};
use framebuffer::{FONT_GLYPHS, FONT_HEIGHT};
use hal::{DirEntry, SocketId, UsbDeviceInfo};
use kernel_api::{
    DateTime, FontMetrics, Glyph, KernelError, SharedBuffer, StdioHooks, Ticks, API_VERSION,
    TICK_HZ,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Pseudo stack-pointer base reported by `get_stack_ptr`; tasks get 64 KiB
/// aprons below it, matching the original layout report.
const STACK_TOP: u64 = 0x5F00_0000;
const STACK_SIZE: u64 = 0x1_0000;

/// Per-task handle onto the kernel. Cheap to clone; programs receive one
/// at entry and never construct their own.
#[derive(Clone)]
pub struct Api {
    state: Rc<RefCell<KernelState>>,
    pid: Pid,
}

impl Api {
    pub(crate) fn new(state: Rc<RefCell<KernelState>>, pid: Pid) -> Self {
        Self { state, pid }
    }

    /// The calling task's pid.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// API surface version.
    pub fn version(&self) -> u32 {
        API_VERSION
    }

    // ---- Console ----------------------------------------------------

    /// Writes one byte through the stdio hooks, or to the raw console
    /// when none are installed.
    pub fn putc(&self, c: u8) {
        let hook = self.state.borrow().stdio.active();
        match hook {
            Some(h) => h.borrow_mut().putc(c),
            None => self.state.borrow_mut().console.putc(c),
        }
    }

    pub fn puts(&self, s: &str) {
        let hook = self.state.borrow().stdio.active();
        match hook {
            Some(h) => h.borrow_mut().puts(s),
            None => self.state.borrow_mut().console.puts(s),
        }
    }

    /// Writes straight to the UART transcript, bypassing the hooks. Used
    /// for panic banners and early boot chatter.
    pub fn uart_puts(&self, s: &str) {
        self.state.borrow_mut().uart.push_str(s);
    }

    /// Blocks until a key is available. Keys come from the stdio hooks
    /// when installed, the raw keyboard otherwise.
    pub fn getc(&self) -> Getc {
        Getc::new(self.state.clone(), self.pid)
    }

    /// True when `getc` would not block.
    pub fn has_key(&self) -> bool {
        let hook = self.state.borrow().stdio.active();
        match hook {
            Some(h) => h.borrow().has_key(),
            None => self.state.borrow().keyboard.has_key(),
        }
    }

    pub fn set_color(&self, color: Pixel) {
        self.state.borrow_mut().console.set_color(color);
    }

    pub fn clear(&self) {
        self.state.borrow_mut().console.clear();
    }

    pub fn set_cursor(&self, x: usize, y: usize) {
        self.state.borrow_mut().console.set_cursor(x, y);
    }

    pub fn set_cursor_enabled(&self, enabled: bool) {
        self.state.borrow_mut().console.set_cursor_enabled(enabled);
    }

    pub fn print_int(&self, value: i64) {
        self.puts(&value.to_string());
    }

    pub fn print_hex(&self, value: u64) {
        self.puts(&format!("{:x}", value));
    }

    pub fn clear_to_eol(&self) {
        self.state.borrow_mut().console.clear_to_eol();
    }

    pub fn clear_region(&self, x: usize, y: usize, w: usize, h: usize) {
        self.state.borrow_mut().console.clear_region(x, y, w, h);
    }

    pub fn console_rows(&self) -> usize {
        self.state.borrow().console.rows()
    }

    pub fn console_cols(&self) -> usize {
        self.state.borrow().console.cols()
    }

    // ---- Memory -----------------------------------------------------

    /// At least `size` bytes of kernel heap, or `None` when exhausted.
    pub fn alloc(&self, size: usize) -> Option<HeapPtr> {
        self.state.borrow_mut().heap.alloc(size)
    }

    /// `free` of `HeapPtr::NULL` is a no-op.
    pub fn free(&self, ptr: HeapPtr) {
        self.state.borrow_mut().heap.free(ptr);
    }

    pub fn alloc_count(&self) -> u64 {
        self.state.borrow().heap.alloc_count()
    }

    // ---- Filesystem -------------------------------------------------

    /// Opens an existing file and returns a handle. `None` for missing
    /// paths and directories.
    pub fn open(&self, path: &str) -> Option<Fd> {
        let mut st = self.state.borrow_mut();
        let path = st.resolve_path(path);
        if !st.vfs.exists(&path) || st.vfs.is_dir(&path) {
            return None;
        }
        let fd = Fd(st.next_fd);
        st.next_fd += 1;
        st.fds.insert(fd, crate::OpenFile { path, pos: 0 });
        Some(fd)
    }

    pub fn close(&self, fd: Fd) {
        self.state.borrow_mut().fds.remove(&fd);
    }

    /// Reads up to `max` bytes at the handle's position, advancing it.
    /// `None` on a stale handle; an empty vec at end of file.
    pub fn read(&self, fd: Fd, max: usize) -> Option<Vec<u8>> {
        let st = &mut *self.state.borrow_mut();
        let file = st.fds.get_mut(&fd)?;
        let mut buf = vec![0u8; max];
        let n = st.vfs.read_at(&file.path, file.pos, &mut buf).ok()?;
        file.pos += n;
        buf.truncate(n);
        Some(buf)
    }

    /// Writes at the handle's position, advancing it.
    pub fn write(&self, fd: Fd, data: &[u8]) -> Option<usize> {
        let st = &mut *self.state.borrow_mut();
        let file = st.fds.get_mut(&fd)?;
        let n = st.vfs.write_at(&file.path, file.pos, data).ok()?;
        file.pos += n;
        Some(n)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        let st = self.state.borrow();
        let path = st.resolve_path(path);
        st.vfs.is_dir(&path)
    }

    pub fn file_size(&self, path: &str) -> Option<usize> {
        let st = self.state.borrow();
        let path = st.resolve_path(path);
        st.vfs.file_size(&path).ok()
    }

    pub fn create(&self, path: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        st.vfs.create(&path).map_err(vfs_err)
    }

    pub fn mkdir(&self, path: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        st.vfs.mkdir(&path).map_err(vfs_err)
    }

    pub fn delete(&self, path: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        st.vfs.delete(&path).map_err(vfs_err)
    }

    /// Fails on non-empty directories; use [`Api::delete_recursive`].
    pub fn delete_dir(&self, path: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        st.vfs.delete_dir(&path).map_err(vfs_err)
    }

    pub fn delete_recursive(&self, path: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        st.vfs.delete_recursive(&path).map_err(vfs_err)
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), KernelError> {
        let st = &mut *self.state.borrow_mut();
        let from = st.resolve_path(from);
        let to = st.resolve_path(to);
        st.vfs.rename(&from, &to).map_err(vfs_err)
    }

    pub fn readdir(&self, path: &str) -> Option<Vec<DirEntry>> {
        let st = self.state.borrow();
        let path = st.resolve_path(path);
        st.vfs.readdir(&path).ok()
    }

    /// Changes the working directory; false when the path is not a
    /// directory.
    pub fn set_cwd(&self, path: &str) -> bool {
        let st = &mut *self.state.borrow_mut();
        let path = st.resolve_path(path);
        if st.vfs.is_dir(&path) {
            st.cwd = path;
            true
        } else {
            false
        }
    }

    pub fn get_cwd(&self) -> String {
        self.state.borrow().cwd.clone()
    }

    // ---- Process ----------------------------------------------------

    /// Creates a child task and returns immediately with its pid.
    pub fn spawn(&self, path: &str) -> Result<Pid, KernelError> {
        self.spawn_args(path, &[])
    }

    pub fn spawn_args(&self, path: &str, args: &[&str]) -> Result<Pid, KernelError> {
        spawn_internal(&self.state, self.pid, path, args)
    }

    /// Creates a child and blocks until it exits; resolves to its exit
    /// code and frees its slot.
    pub async fn exec(&self, path: &str) -> Result<i32, KernelError> {
        self.exec_args(path, &[]).await
    }

    pub async fn exec_args(&self, path: &str, args: &[&str]) -> Result<i32, KernelError> {
        let child = self.spawn_args(path, args)?;
        Ok(ExecWait::new(self.state.clone(), self.pid, child).await)
    }

    /// Voluntarily gives up the CPU for one dispatch round.
    pub fn yield_now(&self) -> YieldNow {
        YieldNow::new()
    }

    /// Marks the target zombie with exit code −1. Advisory: a target
    /// blocked in a driver call is never dispatched again but finishes
    /// nothing early. False when the pid has already exited or does not
    /// resolve to a task.
    pub fn kill(&self, pid: Pid) -> bool {
        crate::kill_internal(&self.state, pid)
    }

    pub fn get_process_count(&self) -> usize {
        self.state.borrow().procs.count_live()
    }

    /// Raw-index process info; `None` on a free slot.
    pub fn get_process_info(&self, index: usize) -> Option<ProcessInfo> {
        let st = self.state.borrow();
        let slot = st.procs.by_index(index)?;
        if slot.state == ProcessState::Free {
            return None;
        }
        Some(ProcessInfo {
            name: slot.name.clone(),
            state: slot.state,
            parent: slot.parent.index(),
            exit_code: slot.exit_code,
        })
    }

    /// The monitor's one-call view of the whole system.
    pub fn snapshot(&self) -> SystemSnapshot {
        self.state.borrow().snapshot()
    }

    // ---- Timing / RTC -----------------------------------------------

    pub fn uptime_ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    /// Blocks for at least `ms` milliseconds, rounded up to the 10 ms
    /// tick; the task is `Blocked` for the duration.
    pub fn sleep_ms(&self, ms: u64) -> Sleep {
        let start = self.state.borrow().ticks;
        let wake = Ticks(start) + Ticks::from_millis(ms);
        Sleep::new(self.state.clone(), self.pid, wake)
    }

    /// Parks the task until the next dispatch round.
    pub async fn wfi(&self) {
        YieldNow::new().await
    }

    /// Unix-epoch seconds: RTC base plus uptime.
    pub fn timestamp(&self) -> u64 {
        let st = self.state.borrow();
        st.rtc_base + st.ticks / TICK_HZ
    }

    pub fn datetime(&self) -> DateTime {
        DateTime::from_unix(self.timestamp())
    }

    pub fn mem_used(&self) -> u64 {
        self.state.borrow().heap.used() as u64
    }

    pub fn mem_free(&self) -> u64 {
        self.state.borrow().heap.free_bytes() as u64
    }

    // ---- Framebuffer ------------------------------------------------

    pub fn fb_width(&self) -> usize {
        self.state.borrow().fb.width()
    }

    pub fn fb_height(&self) -> usize {
        self.state.borrow().fb.height()
    }

    pub fn fb_put_pixel(&self, x: usize, y: usize, color: Pixel) {
        self.state.borrow_mut().fb.put_pixel(x, y, color);
    }

    pub fn fb_get_pixel(&self, x: usize, y: usize) -> Pixel {
        self.state.borrow().fb.pixel(x, y)
    }

    /// Rectangle fill; routed through the DMA engine when one is present.
    pub fn fb_fill_rect(&self, x: i32, y: i32, w: i32, h: i32, color: Pixel) {
        let st = &mut *self.state.borrow_mut();
        st.fb.fill_rect_dma(&mut *st.dma, x, y, w, h, color);
    }

    pub fn fb_draw_char(&self, x: i32, y: i32, c: u8, fg: Pixel, bg: Pixel) {
        self.state.borrow_mut().fb.draw_char(x, y, c, fg, bg);
    }

    pub fn fb_draw_string(&self, x: i32, y: i32, s: &str, fg: Pixel, bg: Pixel) {
        self.state.borrow_mut().fb.draw_string(x, y, s, fg, bg);
    }

    /// The built-in 8×16 glyph table.
    pub fn font_data(&self) -> &'static [[u8; FONT_HEIGHT]; FONT_GLYPHS] {
        framebuffer::font_data()
    }

    /// Direct framebuffer plus DMA access for a compositor pass. The
    /// callback must not call back into the API.
    pub fn with_framebuffer<R>(
        &self,
        f: impl FnOnce(&mut framebuffer::Framebuffer, &mut dyn hal::DmaEngine) -> R,
    ) -> R {
        let st = &mut *self.state.borrow_mut();
        let crate::KernelState { fb, dma, .. } = st;
        f(fb, &mut **dma)
    }

    // ---- Acceleration -----------------------------------------------

    pub fn fb_has_hw_double_buffer(&self) -> bool {
        self.state.borrow().fb.has_hw_double_buffer()
    }

    /// Publishes plane 0 or 1; no-op when single-buffered.
    pub fn fb_flip(&self, plane: usize) {
        self.state.borrow_mut().fb.flip(plane);
    }

    /// Index of the hidden plane drawing currently targets.
    pub fn fb_backbuffer(&self) -> usize {
        self.state.borrow().fb.backbuffer_index()
    }

    pub fn dma_available(&self) -> bool {
        self.state.borrow().dma.available()
    }

    /// Word fill through the DMA engine; callers must have checked
    /// availability and fall back to a scalar loop otherwise.
    pub fn dma_fill(&self, dst: &mut [u32], value: u32) {
        self.state.borrow_mut().dma.fill(dst, value);
    }

    pub fn dma_copy(&self, dst: &mut [u32], src: &[u32]) {
        self.state.borrow_mut().dma.copy(dst, src);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn dma_copy_2d(
        &self,
        dst: &mut [u32],
        dst_stride: usize,
        dst_x: usize,
        dst_y: usize,
        src: &[u32],
        src_stride: usize,
        w: usize,
        h: usize,
    ) {
        self.state
            .borrow_mut()
            .dma
            .copy_2d(dst, dst_stride, dst_x, dst_y, src, src_stride, w, h);
    }

    /// Blits a source buffer into the framebuffer.
    pub fn dma_fb_copy(&self, x: i32, y: i32, src: &[u32], src_w: usize, src_h: usize) {
        self.state.borrow_mut().fb.blit(x, y, src, src_w, src_h);
    }

    // ---- Mouse ------------------------------------------------------

    pub fn mouse_get_pos(&self) -> (i32, i32) {
        self.state.borrow().mouse.pos()
    }

    pub fn mouse_get_buttons(&self) -> core_types::MouseButtons {
        self.state.borrow().mouse.buttons()
    }

    pub fn mouse_poll(&self) -> bool {
        self.state.borrow_mut().mouse.poll()
    }

    pub fn mouse_set_pos(&self, x: i32, y: i32) {
        self.state.borrow_mut().mouse.set_pos(x, y);
    }

    pub fn mouse_get_delta(&self) -> (i32, i32) {
        self.state.borrow_mut().mouse.take_delta()
    }

    // ---- Windowing --------------------------------------------------

    /// Creates a window owned by the calling task. `None` until a window
    /// server registers, or when its table is full.
    pub fn window_create(&self, x: i32, y: i32, w: i32, h: i32, title: &str) -> Option<WindowId> {
        let ws = self.state.borrow().window_server.clone()?;
        let wid = ws
            .borrow_mut()
            .create(self.pid, core_types::Rect::new(x, y, w, h), title);
        wid
    }

    pub fn window_destroy(&self, wid: WindowId) {
        if let Some(ws) = self.state.borrow().window_server.clone() {
            ws.borrow_mut().destroy(wid);
        }
    }

    /// The window's content buffer; `None` after destroy. Re-fetch after
    /// a `Resize` event — the server may have reallocated.
    pub fn window_get_buffer(&self, wid: WindowId) -> Option<SharedBuffer> {
        let ws = self.state.borrow().window_server.clone()?;
        let buf = ws.borrow().buffer(wid);
        buf
    }

    /// Non-blocking event dequeue.
    pub fn window_poll_event(&self, wid: WindowId) -> Option<WindowEvent> {
        let ws = self.state.borrow().window_server.clone()?;
        let ev = ws.borrow_mut().poll_event(wid);
        ev
    }

    pub fn window_invalidate(&self, wid: WindowId) {
        if let Some(ws) = self.state.borrow().window_server.clone() {
            ws.borrow_mut().invalidate(wid);
        }
    }

    pub fn window_set_title(&self, wid: WindowId, title: &str) {
        if let Some(ws) = self.state.borrow().window_server.clone() {
            ws.borrow_mut().set_title(wid, title);
        }
    }

    /// True once a desktop has registered windowing.
    pub fn window_server_installed(&self) -> bool {
        self.state.borrow().window_server.is_some()
    }

    // ---- Stdio hooks ------------------------------------------------

    /// Installs console hooks; they intercept every console helper until
    /// the matching [`Api::restore_stdio`]. Installation nests.
    pub fn install_stdio(&self, hooks: Rc<RefCell<dyn StdioHooks>>) {
        self.state.borrow_mut().stdio.install(hooks);
    }

    /// Uninstalls the most recent hooks, reactivating the previous set.
    pub fn restore_stdio(&self) -> Option<Rc<RefCell<dyn StdioHooks>>> {
        self.state.borrow_mut().stdio.restore()
    }

    pub fn stdio_redirected(&self) -> bool {
        self.state.borrow().stdio.is_redirected()
    }

    // ---- TrueType rendering -----------------------------------------

    /// True once a TTF engine has registered.
    pub fn ttf_is_ready(&self) -> bool {
        self.state.borrow().ttf.is_some()
    }

    /// A rasterized glyph, or `None` before an engine registers (or for
    /// codepoints the engine cannot render).
    pub fn ttf_get_glyph(&self, codepoint: i32, size: i32, style: i32) -> Option<Glyph> {
        let ttf = self.state.borrow().ttf.clone()?;
        let glyph = ttf.borrow_mut().glyph(codepoint, size, style);
        glyph
    }

    /// Horizontal advance, or 0 before an engine registers.
    pub fn ttf_get_advance(&self, codepoint: i32, size: i32) -> i32 {
        match self.state.borrow().ttf.clone() {
            Some(ttf) => ttf.borrow_mut().advance(codepoint, size),
            None => 0,
        }
    }

    /// Kerning adjustment between a pair, or 0 before an engine registers.
    pub fn ttf_get_kerning(&self, left: i32, right: i32, size: i32) -> i32 {
        match self.state.borrow().ttf.clone() {
            Some(ttf) => ttf.borrow_mut().kerning(left, right, size),
            None => 0,
        }
    }

    pub fn ttf_get_metrics(&self, size: i32) -> Option<FontMetrics> {
        let ttf = self.state.borrow().ttf.clone()?;
        let metrics = ttf.borrow_mut().metrics(size);
        Some(metrics)
    }

    // ---- Windows executables ----------------------------------------

    /// True once a winexec host has registered.
    pub fn winexec_supported(&self) -> bool {
        self.state.borrow().winexec.is_some()
    }

    /// Exit code of the hosted executable, or −1 when no host registered.
    pub fn winexec_run(&self, path: &str) -> i32 {
        match self.state.borrow().winexec.clone() {
            Some(host) => host.borrow_mut().run(path),
            None => -1,
        }
    }

    // ---- FTP server -------------------------------------------------

    /// Starts the FTP server; false when none registered.
    pub fn ftp_start(&self, port: u16) -> bool {
        match self.state.borrow().ftp.clone() {
            Some(ftp) => {
                ftp.borrow_mut().start(port);
                true
            }
            None => false,
        }
    }

    pub fn ftp_stop(&self) {
        if let Some(ftp) = self.state.borrow().ftp.clone() {
            ftp.borrow_mut().stop();
        }
    }

    pub fn ftp_is_running(&self) -> bool {
        match self.state.borrow().ftp.clone() {
            Some(ftp) => ftp.borrow().is_running(),
            None => false,
        }
    }

    pub fn ftp_poll(&self) {
        if let Some(ftp) = self.state.borrow().ftp.clone() {
            ftp.borrow_mut().poll();
        }
    }

    // ---- WiFi -------------------------------------------------------

    /// True once a WiFi radio has registered.
    pub fn wifi_available(&self) -> bool {
        self.state.borrow().wifi.is_some()
    }

    pub fn wifi_enable(&self) -> bool {
        match self.state.borrow().wifi.clone() {
            Some(wifi) => wifi.borrow_mut().enable(),
            None => false,
        }
    }

    pub fn wifi_disable(&self) -> bool {
        match self.state.borrow().wifi.clone() {
            Some(wifi) => wifi.borrow_mut().disable(),
            None => false,
        }
    }

    pub fn wifi_is_enabled(&self) -> bool {
        match self.state.borrow().wifi.clone() {
            Some(wifi) => wifi.borrow().is_enabled(),
            None => false,
        }
    }

    pub fn wifi_connect(&self, ssid: &str, passphrase: &str) -> bool {
        match self.state.borrow().wifi.clone() {
            Some(wifi) => wifi.borrow_mut().connect(ssid, passphrase),
            None => false,
        }
    }

    pub fn wifi_disconnect(&self) {
        if let Some(wifi) = self.state.borrow().wifi.clone() {
            wifi.borrow_mut().disconnect();
        }
    }

    pub fn wifi_connected_ssid(&self) -> Option<String> {
        let wifi = self.state.borrow().wifi.clone()?;
        let ssid = wifi.borrow().connected_ssid();
        ssid
    }

    /// The radio's MAC address, or `None` before one registers.
    pub fn wifi_get_mac(&self) -> Option<[u8; 6]> {
        let wifi = self.state.borrow().wifi.clone()?;
        let mac = wifi.borrow().mac();
        Some(mac)
    }

    // ---- Sound ------------------------------------------------------

    pub fn sound_play_wav(&self, data: &[u8]) -> Result<(), KernelError> {
        self.state
            .borrow_mut()
            .sound
            .play_wav(data)
            .map(|_| ())
            .map_err(|e| KernelError::IoError(e.to_string()))
    }

    /// Starts PCM playback and blocks the task until it finishes.
    pub async fn sound_play_pcm(&self, samples: &[i16]) -> Result<(), KernelError> {
        self.sound_play_pcm_async(samples)?;
        SoundDone::new(self.state.clone(), self.pid).await;
        Ok(())
    }

    /// Starts PCM playback and returns immediately.
    pub fn sound_play_pcm_async(&self, samples: &[i16]) -> Result<(), KernelError> {
        self.state
            .borrow_mut()
            .sound
            .play_pcm(samples)
            .map(|_| ())
            .map_err(|e| KernelError::IoError(e.to_string()))
    }

    pub fn sound_stop(&self) {
        self.state.borrow_mut().sound.stop();
    }

    pub fn sound_is_playing(&self) -> bool {
        self.state.borrow().sound.is_playing()
    }

    pub fn sound_pause(&self) {
        self.state.borrow_mut().sound.pause();
    }

    pub fn sound_resume(&self) {
        self.state.borrow_mut().sound.resume();
    }

    pub fn sound_is_paused(&self) -> bool {
        self.state.borrow().sound.is_paused()
    }

    // ---- Networking -------------------------------------------------

    /// One echo request; `Some(rtt_ms)` or `None` on timeout. The only
    /// primitive with an explicit timeout.
    pub fn net_ping(&self, ip: [u8; 4], seq: u16, timeout_ms: u32) -> Option<u32> {
        self.state.borrow_mut().net.ping(ip, seq, timeout_ms).ok()
    }

    pub fn net_poll(&self) {
        self.state.borrow_mut().net.poll();
    }

    pub fn net_get_ip(&self) -> [u8; 4] {
        self.state.borrow().net.ip()
    }

    pub fn net_get_mac(&self) -> [u8; 6] {
        self.state.borrow().net.mac()
    }

    pub fn dns_resolve(&self, host: &str) -> Option<[u8; 4]> {
        self.state.borrow_mut().net.dns_resolve(host).ok()
    }

    pub fn tcp_connect(&self, ip: [u8; 4], port: u16) -> Option<SocketId> {
        self.state.borrow_mut().net.tcp_connect(ip, port).ok()
    }

    pub fn tcp_send(&self, sock: SocketId, data: &[u8]) -> Option<usize> {
        self.state.borrow_mut().net.tcp_send(sock, data).ok()
    }

    /// Blocks until the socket has data; `None` once disconnected.
    pub fn tcp_recv(&self, sock: SocketId, max: usize) -> NetRecv {
        NetRecv::new(self.state.clone(), self.pid, sock, max, false)
    }

    pub fn tcp_close(&self, sock: SocketId) {
        self.state.borrow_mut().net.tcp_close(sock);
    }

    pub fn tcp_is_connected(&self, sock: SocketId) -> bool {
        self.state.borrow().net.tcp_is_connected(sock)
    }

    pub fn tls_connect(&self, host: &str, port: u16) -> Option<SocketId> {
        self.state.borrow_mut().net.tls_connect(host, port).ok()
    }

    pub fn tls_send(&self, sock: SocketId, data: &[u8]) -> Option<usize> {
        self.state.borrow_mut().net.tls_send(sock, data).ok()
    }

    pub fn tls_recv(&self, sock: SocketId, max: usize) -> NetRecv {
        NetRecv::new(self.state.clone(), self.pid, sock, max, true)
    }

    pub fn tls_close(&self, sock: SocketId) {
        self.state.borrow_mut().net.tls_close(sock);
    }

    pub fn tls_is_connected(&self, sock: SocketId) -> bool {
        self.state.borrow().net.tls_is_connected(sock)
    }

    // ---- Diagnostics ------------------------------------------------

    pub fn get_disk_total(&self) -> u64 {
        self.state.borrow().vfs.disk_total()
    }

    pub fn get_disk_free(&self) -> u64 {
        self.state.borrow().vfs.disk_free()
    }

    pub fn get_ram_total(&self) -> u64 {
        self.state.borrow().config.ram_total
    }

    pub fn get_heap_start(&self) -> u64 {
        self.state.borrow().heap.start_address()
    }

    pub fn get_heap_end(&self) -> u64 {
        self.state.borrow().heap.end_address()
    }

    /// The task's nominal stack pointer. Simulated tasks run on the host
    /// stack; this reports where the task's stack would sit.
    pub fn get_stack_ptr(&self) -> u64 {
        STACK_TOP - self.pid.index() as u64 * STACK_SIZE
    }

    pub fn get_alloc_count(&self) -> u64 {
        self.alloc_count()
    }

    /// Appends a line to the kernel log.
    pub fn klog(&self, level: LogLevel, message: &str) {
        self.state.borrow_mut().klog.log(level, message);
    }

    /// Reads retained log bytes from `offset`; returns bytes copied.
    pub fn klog_read(&self, offset: usize, buf: &mut [u8]) -> usize {
        self.state.borrow().klog.read(offset, buf)
    }

    pub fn klog_size(&self) -> usize {
        self.state.borrow().klog.size()
    }

    pub fn get_cpu_name(&self) -> String {
        self.state.borrow().cpu.name().to_string()
    }

    pub fn get_cpu_freq_mhz(&self) -> u32 {
        self.state.borrow().cpu.freq_mhz()
    }

    pub fn get_cpu_cores(&self) -> u32 {
        self.state.borrow().cpu.cores()
    }

    // ---- Platform ---------------------------------------------------

    pub fn led_on(&self) {
        self.state.borrow_mut().led.on();
    }

    pub fn led_off(&self) {
        self.state.borrow_mut().led.off();
    }

    pub fn led_toggle(&self) {
        self.state.borrow_mut().led.toggle();
    }

    pub fn led_status(&self) -> bool {
        self.state.borrow().led.status()
    }

    pub fn usb_device_count(&self) -> usize {
        self.state.borrow().usb.device_count()
    }

    pub fn usb_device_info(&self, index: usize) -> Option<UsbDeviceInfo> {
        self.state.borrow().usb.device_info(index)
    }
}

fn vfs_err(e: hal::VfsError) -> KernelError {
    match e {
        hal::VfsError::NotFound => KernelError::NotFound("path".into()),
        other => KernelError::IoError(other.to_string()),
    }
}
