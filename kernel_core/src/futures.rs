//! Scheduler suspension points
//!
//! Every blocking primitive in the API is one of these futures. The
//! contract with the dispatcher is simple: a future that cannot make
//! progress marks its task `Blocked` with the matching [`BlockReason`]
//! and returns `Pending`; the dispatcher's wake pass flips the task back
//! to `Ready` when the condition holds and the next poll observes it.
//!
//! No waker plumbing is involved — the dispatcher polls ready tasks
//! round-robin with a no-op waker, which is what makes the schedule
//! deterministic.

use crate::process::BlockReason;
use crate::KernelState;
use core_types::Pid;
use hal::SocketId;
use kernel_api::Ticks;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

type Shared = Rc<RefCell<KernelState>>;

/// `yield()`: back of the ready queue once, then runnable.
pub struct YieldNow {
    yielded: bool,
}

impl YieldNow {
    pub fn new() -> Self {
        Self { yielded: false }
    }
}

impl Default for YieldNow {
    fn default() -> Self {
        Self::new()
    }
}

impl Future for YieldNow {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.get_mut().yielded = true;
            Poll::Pending
        }
    }
}

/// `sleep_ms`: blocked until the clock reaches the wake tick.
pub struct Sleep {
    state: Shared,
    pid: Pid,
    wake_tick: Ticks,
}

impl Sleep {
    pub(crate) fn new(state: Shared, pid: Pid, wake_tick: Ticks) -> Self {
        Self {
            state,
            pid,
            wake_tick,
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let mut st = self.state.borrow_mut();
        if st.ticks >= self.wake_tick.0 {
            Poll::Ready(())
        } else {
            let tick = st.ticks;
            st.procs
                .mark_blocked(self.pid, BlockReason::SleepUntil(self.wake_tick), tick);
            Poll::Pending
        }
    }
}

/// `getc`: blocked until the active input source has a key.
pub struct Getc {
    state: Shared,
    pid: Pid,
}

impl Getc {
    pub(crate) fn new(state: Shared, pid: Pid) -> Self {
        Self { state, pid }
    }
}

impl Future for Getc {
    type Output = i32;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<i32> {
        // Hooks first, raw keyboard second; the hook cell is separate
        // from the kernel cell, so release the kernel borrow before
        // calling into it.
        let hook = self.state.borrow().stdio.active();
        if let Some(hook) = hook {
            if let Some(key) = hook.borrow_mut().getc() {
                return Poll::Ready(key);
            }
        } else if let Some(key) = self.state.borrow_mut().keyboard.poll_key() {
            return Poll::Ready(key);
        }
        let mut st = self.state.borrow_mut();
        let tick = st.ticks;
        st.procs.mark_blocked(self.pid, BlockReason::Input, tick);
        Poll::Pending
    }
}

/// `exec`: blocked until the child is a zombie, then reaps it.
pub struct ExecWait {
    state: Shared,
    pid: Pid,
    child: Pid,
}

impl ExecWait {
    pub(crate) fn new(state: Shared, pid: Pid, child: Pid) -> Self {
        Self { state, pid, child }
    }
}

impl Future for ExecWait {
    type Output = i32;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<i32> {
        let mut st = self.state.borrow_mut();
        let tick = st.ticks;
        match st.procs.state(self.child) {
            core_types::ProcessState::Zombie => {
                if let Some((code, allocs)) = st.procs.reap(self.child, tick) {
                    for ptr in allocs {
                        st.heap.free(ptr);
                    }
                    Poll::Ready(code)
                } else {
                    Poll::Ready(-1)
                }
            }
            // Someone else already collected the slot.
            core_types::ProcessState::Free => Poll::Ready(-1),
            _ => {
                st.procs
                    .mark_blocked(self.pid, BlockReason::ChildExit(self.child), tick);
                Poll::Pending
            }
        }
    }
}

/// Blocking PCM playback: blocked until the sound device goes idle.
pub struct SoundDone {
    state: Shared,
    pid: Pid,
}

impl SoundDone {
    pub(crate) fn new(state: Shared, pid: Pid) -> Self {
        Self { state, pid }
    }
}

impl Future for SoundDone {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let mut st = self.state.borrow_mut();
        if !st.sound.is_playing() {
            return Poll::Ready(());
        }
        let tick = st.ticks;
        st.procs.mark_blocked(self.pid, BlockReason::Sound, tick);
        Poll::Pending
    }
}

/// `tcp_recv`/`tls_recv`: blocked until the socket has data, then drains
/// up to `max` bytes. Resolves to `None` when the socket is gone.
pub struct NetRecv {
    state: Shared,
    pid: Pid,
    sock: SocketId,
    max: usize,
    tls: bool,
}

impl NetRecv {
    pub(crate) fn new(state: Shared, pid: Pid, sock: SocketId, max: usize, tls: bool) -> Self {
        Self {
            state,
            pid,
            sock,
            max,
            tls,
        }
    }
}

impl Future for NetRecv {
    type Output = Option<Vec<u8>>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Vec<u8>>> {
        let mut st = self.state.borrow_mut();
        let connected = if self.tls {
            st.net.tls_is_connected(self.sock)
        } else {
            st.net.tcp_is_connected(self.sock)
        };
        if !connected {
            return Poll::Ready(None);
        }
        let mut buf = vec![0u8; self.max];
        let result = if self.tls {
            st.net.tls_recv(self.sock, &mut buf)
        } else {
            st.net.tcp_recv(self.sock, &mut buf)
        };
        match result {
            Ok(n) => {
                buf.truncate(n);
                Poll::Ready(Some(buf))
            }
            Err(hal::NetError::WouldBlock) => {
                let tick = st.ticks;
                st.procs
                    .mark_blocked(self.pid, BlockReason::NetRecv(self.sock), tick);
                Poll::Pending
            }
            Err(_) => Poll::Ready(None),
        }
    }
}
