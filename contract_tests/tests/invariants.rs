//! Property suite: the invariants every conforming runtime must hold.

use core_types::{keys, MouseButtons, Pid, ProcessState, Rect, WindowEventKind, MAX_PROCESSES};
use kernel_api::{FontMetrics, Glyph, StdioHooks, TtfEngine, WinExecHost, WindowServer};
use kernel_core::test_utils::TestKernelBuilder;
use kernel_core::{program, ScheduleEvent};
use services_window_server::DesktopWindowServer;
use std::cell::RefCell;
use std::rc::Rc;

/// Scheduler liveness: with three periodically yielding tasks, no task
/// waits more than a full round between turns.
#[test]
fn test_round_robin_liveness() {
    let log: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let make = |log: Rc<RefCell<Vec<usize>>>| {
        program(move |api, _argv| {
            let log = log.clone();
            async move {
                for _ in 0..4 {
                    log.borrow_mut().push(api.pid().index());
                    api.yield_now().await;
                }
                0
            }
        })
    };
    let t = TestKernelBuilder::new()
        .program("/bin/a", make(log.clone()))
        .program("/bin/b", make(log.clone()))
        .program("/bin/c", make(log.clone()))
        .build();
    let a = t.kernel.spawn("/bin/a", &[]).unwrap();
    let b = t.kernel.spawn("/bin/b", &[]).unwrap();
    let c = t.kernel.spawn("/bin/c", &[]).unwrap();
    t.kernel.run_until_idle();

    let log = log.borrow();
    assert_eq!(log.len(), 12);
    // Between two turns of any task, every other live task gets a turn.
    for (i, &pid) in log.iter().enumerate() {
        if let Some(next) = log[i + 1..].iter().position(|&p| p == pid) {
            assert!(next < 3, "task {pid} starved for {next} dispatches");
        }
    }
    assert_eq!(t.kernel.process_state(a), ProcessState::Zombie);
    assert_eq!(t.kernel.process_state(b), ProcessState::Zombie);
    assert_eq!(t.kernel.process_state(c), ProcessState::Zombie);
}

/// Process table bound: the slot after the last one is refused.
#[test]
fn test_process_table_bound() {
    let t = TestKernelBuilder::new()
        .program("/bin/sleeper", program(|api, _argv| async move {
            api.sleep_ms(60_000).await;
            0
        }))
        .build();
    for _ in 0..MAX_PROCESSES {
        t.kernel.spawn("/bin/sleeper", &[]).unwrap();
    }
    assert!(t.kernel.spawn("/bin/sleeper", &[]).is_err());
}

/// Zombie reaping: exec frees the slot; an unwaited child stays zombie
/// until the parent exits and the orphan sweep collects it.
#[test]
fn test_zombie_reaping() {
    let t = TestKernelBuilder::new()
        .program("/bin/child", program(|_api, _argv| async { 42 }))
        .program("/bin/execer", program(|api, _argv| async move {
            api.exec("/bin/child").await.unwrap_or(-1)
        }))
        .program("/bin/spawner", program(|api, _argv| async move {
            let child = match api.spawn("/bin/child") {
                Ok(pid) => pid,
                Err(_) => return 1,
            };
            // Let the child run to completion, then observe the zombie.
            api.sleep_ms(100).await;
            let info = api.get_process_info(child.index());
            match info {
                Some(info) if info.state == ProcessState::Zombie => 0,
                _ => 2,
            }
        }))
        .build();

    let execer = t.kernel.spawn("/bin/execer", &[]).unwrap();
    t.kernel.run_until_idle();
    // The execed child's slot was reaped and reused or left free.
    let snap = t.kernel.snapshot();
    assert_eq!(snap.process_count, 1); // only the execer's zombie remains
    assert_eq!(t.kernel.process_state(execer), ProcessState::Zombie);

    let spawner = t.kernel.spawn("/bin/spawner", &[]).unwrap();
    t.kernel.run_until_idle();
    // The spawner observed its child as Zombie (exit code 0) and its own
    // exit swept the orphan.
    let events = t.kernel.schedule_events();
    assert!(events.iter().any(|e| matches!(
        e,
        ScheduleEvent::Exited { pid, code: 0, .. } if *pid == spawner.index()
    )));
    let zombies = t
        .kernel
        .snapshot()
        .processes
        .iter()
        .filter(|p| p.state == ProcessState::Zombie)
        .count();
    assert_eq!(zombies, 2); // execer and spawner; the orphan was reaped
}

/// A zombie is not killable: the repeat kill reports failure, keeps the
/// exit code and records no termination event.
#[test]
fn test_kill_refused_on_zombie() {
    let t = TestKernelBuilder::new()
        .program("/bin/quick", program(|_api, _argv| async { 7 }))
        .build();
    let pid = t.kernel.spawn("/bin/quick", &[]).unwrap();
    t.kernel.run_until_idle();
    assert_eq!(t.kernel.process_state(pid), ProcessState::Zombie);

    assert!(!t.kernel.api_for(Pid(0)).kill(pid));
    let snap = t.kernel.snapshot();
    assert_eq!(snap.processes[0].exit_code, 7);
    assert!(!t
        .kernel
        .schedule_events()
        .iter()
        .any(|e| matches!(e, ScheduleEvent::Killed { .. })));
}

/// Optional capability slots (TTF, winexec, FTP, WiFi) answer with their
/// sentinel before registration and route through once installed.
#[test]
fn test_capability_slots_degrade_then_route() {
    struct BoxGlyphs;
    impl TtfEngine for BoxGlyphs {
        fn glyph(&mut self, _codepoint: i32, size: i32, _style: i32) -> Option<Glyph> {
            Some(Glyph {
                bitmap: vec![255; (size * size) as usize],
                width: size,
                height: size,
                xoff: 0,
                yoff: -size,
                advance: size + 1,
            })
        }
        fn advance(&mut self, _codepoint: i32, size: i32) -> i32 {
            size + 1
        }
        fn kerning(&mut self, _left: i32, _right: i32, _size: i32) -> i32 {
            -1
        }
        fn metrics(&mut self, size: i32) -> FontMetrics {
            FontMetrics {
                ascent: size,
                descent: -4,
                line_gap: 2,
            }
        }
    }
    struct PathLenHost;
    impl WinExecHost for PathLenHost {
        fn run(&mut self, path: &str) -> i32 {
            path.len() as i32
        }
    }

    let t = TestKernelBuilder::new().build();
    let api = t.kernel.api_for(Pid(0));

    // Nothing registered: every group answers with its sentinel.
    assert!(!api.ttf_is_ready());
    assert!(api.ttf_get_glyph('A' as i32, 16, 0).is_none());
    assert_eq!(api.ttf_get_advance('A' as i32, 16), 0);
    assert!(api.ttf_get_metrics(16).is_none());
    assert!(!api.winexec_supported());
    assert_eq!(api.winexec_run("/apps/x.exe"), -1);
    assert!(!api.ftp_start(21));
    assert!(!api.ftp_is_running());
    assert!(!api.wifi_available());
    assert!(!api.wifi_enable());
    assert!(api.wifi_get_mac().is_none());

    t.kernel.install_ttf_engine(Rc::new(RefCell::new(BoxGlyphs)));
    t.kernel.install_winexec_host(Rc::new(RefCell::new(PathLenHost)));

    assert!(api.ttf_is_ready());
    let glyph = api.ttf_get_glyph('A' as i32, 16, 0).unwrap();
    assert_eq!(glyph.advance, 17);
    assert_eq!(glyph.bitmap.len(), 16 * 16);
    assert_eq!(api.ttf_get_kerning('A' as i32, 'V' as i32, 16), -1);
    assert_eq!(api.ttf_get_metrics(16).unwrap().ascent, 16);
    assert!(api.winexec_supported());
    assert_eq!(api.winexec_run("/apps/x.exe"), 11);
}

/// Window event FIFO with a 32-deep lossy ring.
#[test]
fn test_window_event_fifo_and_overflow() {
    let mut ws = DesktopWindowServer::new(640, 480);
    let wid = ws.create(Pid(1), Rect::new(0, 0, 100, 100), "T").unwrap();
    // Drain the creation Focus event so the ring starts empty.
    while ws.poll_event(wid).is_some() {}

    for code in 0..32 {
        ws.handle_key(code);
    }
    ws.handle_key(999); // 33rd: dropped
    assert_eq!(ws.dropped_events(wid), 1);
    for expected in 0..32 {
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::Key);
        assert_eq!(ev.data1, expected);
    }
    assert!(ws.poll_event(wid).is_none());
}

/// Window focus: a MouseDown inside a window transfers focus and arrives
/// in window-local content coordinates with the button mask.
#[test]
fn test_mouse_down_focus_and_local_coords() {
    let mut ws = DesktopWindowServer::new(640, 480);
    let back = ws.create(Pid(1), Rect::new(300, 300, 100, 100), "back").unwrap();
    let w = ws.create(Pid(1), Rect::new(40, 60, 200, 150), "W").unwrap();
    while ws.poll_event(w).is_some() {}
    assert_eq!(ws.focused(), Some(w));
    ws.handle_mouse(40, 60, MouseButtons::empty());
    ws.handle_mouse(90, 130, MouseButtons::LEFT);
    let ev = ws.poll_event(w).unwrap();
    assert_eq!(ev.kind, WindowEventKind::MouseDown);
    assert_eq!(ev.data1, 90 - 40);
    assert_eq!(ev.data2, 130 - 60 - core_types::TITLE_BAR_HEIGHT);
    assert_eq!(ev.data3, MouseButtons::LEFT.bits() as i32);
    assert_eq!(ws.focused(), Some(w));
    // Clicking the background window moves focus there.
    ws.handle_mouse(90, 130, MouseButtons::empty());
    ws.handle_mouse(350, 350, MouseButtons::LEFT);
    assert_eq!(ws.focused(), Some(back));
}

/// Stdio redirection: hook present routes puts away from the console;
/// hook absent routes to the console.
#[test]
fn test_stdio_redirection_routing() {
    struct Sink(Vec<u8>);
    impl StdioHooks for Sink {
        fn putc(&mut self, c: u8) {
            self.0.push(c);
        }
        fn getc(&mut self) -> Option<i32> {
            None
        }
        fn has_key(&self) -> bool {
            false
        }
    }

    let sink = Rc::new(RefCell::new(Sink(Vec::new())));
    let hook = sink.clone();
    let t = TestKernelBuilder::new()
        .program("/bin/p", program(move |api, _argv| {
            let hook = hook.clone();
            async move {
                api.puts("raw");
                api.install_stdio(hook);
                api.puts("hooked");
                api.restore_stdio();
                api.puts("!");
                0
            }
        }))
        .build();
    t.kernel.spawn("/bin/p", &[]).unwrap();
    t.kernel.run_until_idle();
    assert_eq!(sink.borrow().0, b"hooked");
    assert_eq!(t.kernel.console_line(0), "raw!");
}

/// Heap accounting: N allocs followed by N frees restore alloc_count.
#[test]
fn test_heap_alloc_count_balances() {
    let t = TestKernelBuilder::new()
        .program("/bin/churn", program(|api, _argv| async move {
            let before = api.alloc_count();
            let ptrs: Vec<_> = (0..10).filter_map(|_| api.alloc(64)).collect();
            if ptrs.len() != 10 {
                return 1;
            }
            for p in ptrs {
                api.free(p);
            }
            (api.alloc_count() != before) as i32
        }))
        .build();
    let pid = t.kernel.spawn("/bin/churn", &[]).unwrap();
    t.kernel.run_until_idle();
    let exit = t
        .kernel
        .snapshot()
        .processes
        .iter()
        .find(|p| p.name == "churn")
        .map(|p| p.exit_code);
    assert_eq!(exit, Some(0));
    assert_eq!(t.kernel.process_state(pid), ProcessState::Zombie);
}

/// Monotonic time across yields and sleeps.
#[test]
fn test_uptime_is_monotonic() {
    let samples: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let s = samples.clone();
    let t = TestKernelBuilder::new()
        .program("/bin/clockwatch", program(move |api, _argv| {
            let s = s.clone();
            async move {
                for i in 0..5 {
                    s.borrow_mut().push(api.uptime_ticks());
                    if i % 2 == 0 {
                        api.yield_now().await;
                    } else {
                        api.sleep_ms(30).await;
                    }
                }
                s.borrow_mut().push(api.uptime_ticks());
                0
            }
        }))
        .build();
    t.kernel.spawn("/bin/clockwatch", &[]).unwrap();
    t.kernel.run_until_idle();
    let samples = samples.borrow();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]), "{samples:?}");
}

/// Framebuffer pixels read back exactly as written.
#[test]
fn test_framebuffer_color_roundtrip() {
    let t = TestKernelBuilder::new().build();
    let api = t.kernel.api_for(Pid(0));
    api.fb_put_pixel(17, 23, 0x00FF0000);
    assert_eq!(api.fb_get_pixel(17, 23), 0x00FF0000);
    assert_eq!(t.kernel.framebuffer_pixel(17, 23), 0x00FF0000);
}

/// DMA fill produces the identical word pattern to a scalar loop.
#[test]
fn test_dma_fill_equivalence() {
    let t = TestKernelBuilder::new().build();
    let api = t.kernel.api_for(Pid(0));
    assert!(api.dma_available());

    let mut via_dma = vec![0u32; 256];
    api.dma_fill(&mut via_dma, 0x00112233);
    let mut scalar = vec![0u32; 256];
    for word in scalar.iter_mut() {
        *word = 0x00112233;
    }
    assert_eq!(via_dma, scalar);
}

/// Keys observed through getc arrive in push order.
#[test]
fn test_keyboard_fifo_through_getc() {
    let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let t = TestKernelBuilder::new()
        .program("/bin/reader", program(move |api, _argv| {
            let s = s.clone();
            async move {
                for _ in 0..3 {
                    let k = api.getc().await;
                    s.borrow_mut().push(k);
                }
                0
            }
        }))
        .build();
    t.type_str("hi");
    t.press(keys::ENTER);
    t.kernel.spawn("/bin/reader", &[]).unwrap();
    t.kernel.run_until_idle();
    assert_eq!(*seen.borrow(), vec!['h' as i32, 'i' as i32, keys::ENTER]);
}
