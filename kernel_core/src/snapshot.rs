//! Process-info and system-snapshot surface
//!
//! Read-only views the system monitor renders. `ProcessInfo` is the
//! per-slot row of the original `get_process_info`; `SystemSnapshot`
//! bundles it with the memory and uptime counters and serializes to JSON
//! so monitoring output can be captured and diffed in tests.

use core_types::ProcessState;
use serde::{Deserialize, Serialize};

/// One row of the process table, addressed by raw table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub name: String,
    pub state: ProcessState,
    pub parent: usize,
    pub exit_code: i32,
}

/// Point-in-time system state for the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub uptime_ticks: u64,
    pub mem_used: u64,
    pub mem_free: u64,
    pub alloc_count: u64,
    pub process_count: usize,
    pub processes: Vec<ProcessInfo>,
}

impl SystemSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let snap = SystemSnapshot {
            uptime_ticks: 1234,
            mem_used: 4096,
            mem_free: 1_044_480,
            alloc_count: 3,
            process_count: 1,
            processes: vec![ProcessInfo {
                name: "init".into(),
                state: ProcessState::Running,
                parent: 0,
                exit_code: 0,
            }],
        };
        let json = snap.to_json();
        let back: SystemSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
