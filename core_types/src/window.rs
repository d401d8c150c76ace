//! Window table constants and the per-window event record

use serde::{Deserialize, Serialize};

/// Maximum number of simultaneous windows (live table slots).
pub const MAX_WINDOWS: usize = 16;

/// Maximum window title length, including the implicit terminator byte.
/// Titles longer than 31 bytes are truncated.
pub const TITLE_MAX: usize = 32;

/// Height in pixels of the title bar drawn above every window's content
/// buffer. The content buffer a program draws into excludes this strip.
pub const TITLE_BAR_HEIGHT: i32 = 28;

/// Depth of the per-window event ring. When the ring is full the incoming
/// event is dropped (drop-newest); consumers must treat the queue as lossy.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// Discriminant of a [`WindowEvent`].
///
/// The integer values are wire-level and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WindowEventKind {
    None = 0,
    MouseDown = 1,
    MouseUp = 2,
    MouseMove = 3,
    Key = 4,
    Close = 5,
    Focus = 6,
    Unfocus = 7,
    Resize = 8,
}

/// A single event delivered to a window's queue.
///
/// The meaning of the three data fields is fixed per kind:
///
/// | Kind | data1 | data2 | data3 |
/// |---|---|---|---|
/// | MouseDown/Up/Move | local x | local y | button mask |
/// | Key | keycode | 0 | 0 |
/// | Close/Focus/Unfocus | 0 | 0 | 0 |
/// | Resize | new width | new height | 0 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEvent {
    pub kind: WindowEventKind,
    pub data1: i32,
    pub data2: i32,
    pub data3: i32,
}

impl WindowEvent {
    pub fn new(kind: WindowEventKind, data1: i32, data2: i32, data3: i32) -> Self {
        Self {
            kind,
            data1,
            data2,
            data3,
        }
    }

    /// A mouse event in window-local content coordinates.
    pub fn mouse(kind: WindowEventKind, x: i32, y: i32, buttons: u8) -> Self {
        Self::new(kind, x, y, buttons as i32)
    }

    /// A keystroke routed to the focused window.
    pub fn key(code: i32) -> Self {
        Self::new(WindowEventKind::Key, code, 0, 0)
    }

    /// A data-free event (Close, Focus, Unfocus).
    pub fn plain(kind: WindowEventKind) -> Self {
        Self::new(kind, 0, 0, 0)
    }

    /// Buffer geometry changed; the owner must re-fetch its buffer.
    pub fn resize(w: i32, h: i32) -> Self {
        Self::new(WindowEventKind::Resize, w, h, 0)
    }
}
