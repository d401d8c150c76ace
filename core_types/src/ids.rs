//! Unique identifiers for system entities
//!
//! Unlike UUID-based systems, KikiOS identifiers are stable indices into
//! fixed-size kernel tables. A `Pid` names a process-table slot, a
//! `WindowId` names a window-table slot, and an `Fd` names an open file.
//! Slots are reused after reclamation, so an identifier is only meaningful
//! while its slot is live.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process identifier: index into the fixed process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid(pub usize);

impl Pid {
    /// The root task (the first process spawned at boot).
    pub const ROOT: Pid = Pid(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// Window identifier: index into the window server's fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub usize);

impl WindowId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wid {}", self.0)
    }
}

/// Opaque file handle issued by the VFS collaborator.
///
/// The original system handed out cast node pointers; the canonical form is
/// an integer handle (see the redesign notes in the top-level DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fd(pub u32);

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd {}", self.0)
    }
}
