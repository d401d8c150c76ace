//! Key codes and mouse button masks
//!
//! Keys are plain integers: printable ASCII passes through unchanged and
//! non-printable keys use 16-bit codes at `0x100` and above. The same
//! encoding flows through the raw keyboard, the stdio hooks, and window
//! `Key` events, so a program never cares which path a keystroke took.

use bitflags::bitflags;

/// Key codes shared by the keyboard driver, stdio hooks and window events.
pub mod keys {
    /// Ctrl-A..Ctrl-Z occupy 1..=26.
    pub const CTRL_BASE: i32 = 1;
    pub const BACKSPACE: i32 = 8;
    pub const TAB: i32 = 9;
    pub const ENTER: i32 = 10;
    pub const ENTER_CR: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const DELETE_ASCII: i32 = 127;

    pub const UP: i32 = 0x100;
    pub const DOWN: i32 = 0x101;
    pub const LEFT: i32 = 0x102;
    pub const RIGHT: i32 = 0x103;
    pub const HOME: i32 = 0x104;
    pub const END: i32 = 0x105;
    pub const DELETE: i32 = 0x106;
    pub const PGUP: i32 = 0x107;
    pub const PGDN: i32 = 0x108;

    /// True for the printable ASCII range 32..=126.
    pub fn is_printable(code: i32) -> bool {
        (32..=126).contains(&code)
    }
}

bitflags! {
    /// Mouse button state bitmask, as delivered in window event `data3`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
    }
}
