//! # Kernel API
//!
//! This crate defines the contract between the kernel runtime core and the
//! programs and subsystems that plug into it.
//!
//! ## Philosophy
//!
//! The original system handed every program a single table of raw function
//! pointers. The Rust rendering keeps the shape — one stable surface, handed
//! to every program at entry — but replaces nullable pointers with typed
//! optional capabilities:
//!
//! - Errors are a closed [`KernelError`] taxonomy, converted to the historic
//!   sentinel values (−1 / none / false) at the program-facing facade.
//! - The window server, stdio hooks and the optional capabilities (TTF
//!   rendering, the winexec host, FTP, WiFi) are traits installed at
//!   runtime; before installation their operations degrade per the
//!   sentinel rules.
//! - Time is a 100 Hz tick counter, never a wall-clock ambient.
//!
//! ## Non-Goals
//!
//! This is NOT a syscall boundary. Programs share the kernel's address
//! space and call these interfaces directly.

pub mod error;
pub mod extensions;
pub mod stdio;
pub mod time;
pub mod window_server;

pub use error::KernelError;
pub use extensions::{FontMetrics, FtpServer, Glyph, TtfEngine, WifiRadio, WinExecHost};
pub use stdio::StdioHooks;
pub use time::{DateTime, Ticks, MS_PER_TICK, TICK_HZ};
pub use window_server::{SharedBuffer, WindowServer};

/// Version of the kernel API surface, reported to programs at entry.
pub const API_VERSION: u32 = 1;
