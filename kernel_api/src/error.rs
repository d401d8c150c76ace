//! Kernel error taxonomy
//!
//! Internal seams propagate these with `Result` and `?`. The program-facing
//! facade converts them to the sentinel convention of the original API
//! (−1 for integers, `None` for handles, `false` for success booleans), so
//! programs written against the historic check-the-return model keep working.

use thiserror::Error;

/// Errors that can occur inside the kernel runtime core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A path, pid, window id or file handle did not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// The process, window or file-descriptor table is full
    #[error("Out of table slots: {0}")]
    OutOfSlots(&'static str),

    /// Heap allocation failed
    #[error("Out of memory")]
    OutOfMemory,

    /// A driver call failed (disk, network, sound)
    #[error("I/O error: {0}")]
    IoError(String),

    /// A non-blocking primitive had no data available
    #[error("Operation would block")]
    WouldBlock,

    /// An optional subsystem was invoked before its collaborator registered
    #[error("Subsystem not installed: {0}")]
    NotInstalled(&'static str),
}

impl KernelError {
    /// The historic integer sentinel for this error.
    ///
    /// Every fallible integer-returning primitive reports failure as −1
    /// regardless of cause; the taxonomy exists for the kernel log and for
    /// tests, not for the wire.
    pub fn sentinel(&self) -> i32 {
        -1
    }
}
