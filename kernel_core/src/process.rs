//! Process table
//!
//! A fixed array of slots; the pid is the slot index and slots are reused
//! after reaping. All mutation happens from the dispatcher or from API
//! calls running synchronously on the current task, so the table needs no
//! locking.

use crate::heap::HeapPtr;
use core_types::{Pid, ProcessState, MAX_PROCESSES, PROCESS_NAME_MAX};
use hal::SocketId;
use kernel_api::Ticks;
use serde::{Deserialize, Serialize};

/// Why a task is in `Blocked` state. The dispatcher's wake pass checks the
/// matching condition each iteration; there is no other wake path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// `sleep_ms`: runnable once the clock reaches this tick.
    SleepUntil(Ticks),
    /// `getc`/`has_key` wait: runnable once a key is available.
    Input,
    /// `exec`: runnable once the child is a zombie.
    ChildExit(Pid),
    /// Blocking PCM playback: runnable once the device goes idle.
    Sound,
    /// `tcp_recv`/`tls_recv`: runnable once the socket has data.
    NetRecv(SocketId),
}

/// One process-table slot.
pub struct Slot {
    pub name: String,
    pub state: ProcessState,
    pub parent: Pid,
    pub exit_code: i32,
    pub blocked_on: Option<BlockReason>,
    /// Child-owned argv allocations, freed when the slot is reaped.
    pub argv_allocs: Vec<HeapPtr>,
}

impl Slot {
    fn free() -> Self {
        Self {
            name: String::new(),
            state: ProcessState::Free,
            parent: Pid::ROOT,
            exit_code: 0,
            blocked_on: None,
            argv_allocs: Vec::new(),
        }
    }
}

/// Scheduling audit record, kept for tests and the kernel log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    Spawned { pid: usize, tick: u64 },
    Dispatched { pid: usize, tick: u64 },
    Blocked { pid: usize, tick: u64 },
    Woken { pid: usize, tick: u64 },
    Exited { pid: usize, code: i32, tick: u64 },
    Killed { pid: usize, tick: u64 },
    Reaped { pid: usize, tick: u64 },
}

/// The table plus the dispatcher's bookmark.
pub struct ProcessTable {
    slots: Vec<Slot>,
    /// Currently running task, if any.
    pub current: Option<Pid>,
    /// Round-robin scan starts after this index.
    last_dispatched: usize,
    /// Audit trail of scheduling decisions.
    pub events: Vec<ScheduleEvent>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_PROCESSES).map(|_| Slot::free()).collect(),
            current: None,
            last_dispatched: MAX_PROCESSES - 1,
            events: Vec::new(),
        }
    }

    pub fn slot(&self, pid: Pid) -> Option<&Slot> {
        self.slots.get(pid.index())
    }

    pub fn slot_mut(&mut self, pid: Pid) -> Option<&mut Slot> {
        self.slots.get_mut(pid.index())
    }

    pub fn state(&self, pid: Pid) -> ProcessState {
        self.slot(pid).map(|s| s.state).unwrap_or(ProcessState::Free)
    }

    /// Claims a free slot for a new task in `Ready` state. `None` when the
    /// table is full.
    pub fn allocate(&mut self, name: &str, parent: Pid, tick: u64) -> Option<Pid> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.state == ProcessState::Free)?;
        let mut truncated = name.to_string();
        truncated.truncate(PROCESS_NAME_MAX - 1);
        self.slots[idx] = Slot {
            name: truncated,
            state: ProcessState::Ready,
            parent,
            exit_code: 0,
            blocked_on: None,
            argv_allocs: Vec::new(),
        };
        self.events.push(ScheduleEvent::Spawned { pid: idx, tick });
        Some(Pid(idx))
    }

    /// Next `Ready` pid in table order after the previous dispatch, or
    /// `None` when nothing is runnable.
    pub fn pick_next_ready(&mut self) -> Option<Pid> {
        let n = self.slots.len();
        for step in 1..=n {
            let idx = (self.last_dispatched + step) % n;
            if self.slots[idx].state == ProcessState::Ready {
                self.last_dispatched = idx;
                return Some(Pid(idx));
            }
        }
        None
    }

    pub fn mark_running(&mut self, pid: Pid, tick: u64) {
        if let Some(s) = self.slot_mut(pid) {
            s.state = ProcessState::Running;
            s.blocked_on = None;
        }
        self.current = Some(pid);
        self.events.push(ScheduleEvent::Dispatched {
            pid: pid.index(),
            tick,
        });
    }

    pub fn mark_ready(&mut self, pid: Pid) {
        if let Some(s) = self.slot_mut(pid) {
            s.state = ProcessState::Ready;
            s.blocked_on = None;
        }
    }

    pub fn mark_blocked(&mut self, pid: Pid, reason: BlockReason, tick: u64) {
        if let Some(s) = self.slot_mut(pid) {
            if s.state == ProcessState::Running || s.state == ProcessState::Ready {
                s.state = ProcessState::Blocked;
                s.blocked_on = Some(reason);
                self.events.push(ScheduleEvent::Blocked {
                    pid: pid.index(),
                    tick,
                });
            }
        }
    }

    pub fn wake(&mut self, pid: Pid, tick: u64) {
        if let Some(s) = self.slot_mut(pid) {
            // A killed task is never reanimated.
            if s.state == ProcessState::Blocked {
                s.state = ProcessState::Ready;
                s.blocked_on = None;
                self.events.push(ScheduleEvent::Woken {
                    pid: pid.index(),
                    tick,
                });
            }
        }
    }

    /// Transitions to `Zombie` with an exit code. The slot keeps its argv
    /// allocations until it is reaped.
    pub fn mark_zombie(&mut self, pid: Pid, code: i32, tick: u64, killed: bool) {
        if let Some(s) = self.slot_mut(pid) {
            if s.state == ProcessState::Free || s.state == ProcessState::Zombie {
                return;
            }
            s.state = ProcessState::Zombie;
            s.exit_code = code;
            s.blocked_on = None;
            if killed {
                self.events.push(ScheduleEvent::Killed {
                    pid: pid.index(),
                    tick,
                });
            } else {
                self.events.push(ScheduleEvent::Exited {
                    pid: pid.index(),
                    code,
                    tick,
                });
            }
        }
        if self.current == Some(pid) {
            self.current = None;
        }
    }

    /// Releases a zombie slot. Returns its exit code and argv allocations.
    pub fn reap(&mut self, pid: Pid, tick: u64) -> Option<(i32, Vec<HeapPtr>)> {
        let slot = self.slot_mut(pid)?;
        if slot.state != ProcessState::Zombie {
            return None;
        }
        let code = slot.exit_code;
        let allocs = std::mem::take(&mut slot.argv_allocs);
        *slot = Slot::free();
        self.events.push(ScheduleEvent::Reaped {
            pid: pid.index(),
            tick,
        });
        Some((code, allocs))
    }

    /// Children of `parent` that are still live or zombie.
    pub fn children_of(&self, parent: Pid) -> Vec<Pid> {
        (0..self.slots.len())
            .filter(|&i| {
                i != parent.index()
                    && self.slots[i].state != ProcessState::Free
                    && self.slots[i].parent == parent
            })
            .map(Pid)
            .collect()
    }

    /// Number of non-free slots.
    pub fn count_live(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state != ProcessState::Free)
            .count()
    }

    /// Raw slot access by table index for the process-info surface.
    pub fn by_index(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }
}
