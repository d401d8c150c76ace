//! Process table constants and lifecycle states

use serde::{Deserialize, Serialize};

/// Maximum number of simultaneous processes (live table slots).
pub const MAX_PROCESSES: usize = 16;

/// Maximum process name length, including the implicit terminator byte.
/// Names longer than 31 bytes are truncated.
pub const PROCESS_NAME_MAX: usize = 32;

/// Lifecycle state of a process-table slot.
///
/// The integer values are part of the process-info surface consumed by the
/// system monitor and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProcessState {
    /// Slot available for reuse
    Free = 0,
    /// Ready to run
    Ready = 1,
    /// Currently executing (at most one slot at a time)
    Running = 2,
    /// Waiting on sleep, input, or a child
    Blocked = 3,
    /// Exited, slot held until the parent reaps it
    Zombie = 4,
}

impl ProcessState {
    /// Integer code reported through `get_process_info`.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True for any state other than `Free`.
    pub fn is_live(self) -> bool {
        self != ProcessState::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_are_stable() {
        assert_eq!(ProcessState::Free.code(), 0);
        assert_eq!(ProcessState::Ready.code(), 1);
        assert_eq!(ProcessState::Running.code(), 2);
        assert_eq!(ProcessState::Blocked.code(), 3);
        assert_eq!(ProcessState::Zombie.code(), 4);
    }

    #[test]
    fn test_liveness() {
        assert!(!ProcessState::Free.is_live());
        assert!(ProcessState::Zombie.is_live());
    }
}
