//! # Core Types
//!
//! Fundamental identifiers and wire-level constants shared by every part of
//! the KikiOS kernel runtime core.
//!
//! ## Philosophy
//!
//! - **Stable integers, not pointers**: process ids, window ids and file
//!   handles are indices into fixed tables, never cast pointers.
//! - **Serializable**: every shared type derives serde so snapshots and
//!   audit logs can be inspected in tests.
//! - **No behavior**: this crate holds types and constants only; mechanism
//!   lives in `kernel_core` and the service crates.

pub mod color;
pub mod geometry;
pub mod ids;
pub mod input;
pub mod process;
pub mod window;

pub use color::*;
pub use geometry::Rect;
pub use ids::{Fd, Pid, WindowId};
pub use input::{keys, MouseButtons};
pub use process::{ProcessState, MAX_PROCESSES, PROCESS_NAME_MAX};
pub use window::{
    WindowEvent, WindowEventKind, EVENT_QUEUE_DEPTH, MAX_WINDOWS, TITLE_BAR_HEIGHT, TITLE_MAX,
};
