//! Window server contract
//!
//! The core ships no window system. A desktop process registers an
//! implementation of [`WindowServer`] at startup; until then every windowing
//! operation degrades to its sentinel (`None`) and programs are expected to
//! check before drawing.
//!
//! ## Buffer ownership
//!
//! The server owns every window's pixel memory. Programs receive a
//! [`SharedBuffer`] — a counted handle onto the same pixels — which stays
//! valid until the window is destroyed or resized. On `Resize` the server
//! swaps in a fresh allocation, so a program holding the old handle draws
//! into orphaned memory until it re-fetches. This is the same contract the
//! original raw-pointer API had, minus the use-after-free.

use core_types::{Pid, Rect, WindowEvent, WindowId};
use std::cell::RefCell;
use std::rc::Rc;

/// A counted handle onto a window's content pixels.
///
/// Pixels are `0x00RRGGBB` words, row-major, `width * height` long where
/// `height` excludes the title bar.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    pub pixels: Rc<RefCell<Vec<u32>>>,
    pub width: usize,
    pub height: usize,
}

impl SharedBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: Rc::new(RefCell::new(vec![0; width * height])),
            width,
            height,
        }
    }

    /// Writes one pixel, ignoring out-of-bounds coordinates.
    pub fn put_pixel(&self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels.borrow_mut()[y * self.width + x] = color;
        }
    }

    /// Fills the whole buffer with one color.
    pub fn fill(&self, color: u32) {
        self.pixels.borrow_mut().fill(color);
    }
}

/// The six windowing operations plus the owner-exit sweep the scheduler
/// relies on. Installed into the kernel by the desktop process.
pub trait WindowServer {
    /// Allocates a window slot and its pixel buffer, puts it topmost and
    /// focused. `None` when the window table is exhausted.
    fn create(&mut self, owner: Pid, rect: Rect, title: &str) -> Option<WindowId>;

    /// Releases the slot and its buffer. Focus moves to the new front-most
    /// non-minimized window. No-op on an id that does not resolve.
    fn destroy(&mut self, wid: WindowId);

    /// The window's current content buffer, or `None` after destruction.
    fn buffer(&self, wid: WindowId) -> Option<SharedBuffer>;

    /// Dequeues the oldest pending event. Never blocks.
    fn poll_event(&mut self, wid: WindowId) -> Option<WindowEvent>;

    /// Marks the window's content as needing a recomposite.
    fn invalidate(&mut self, wid: WindowId);

    /// Replaces the title (truncated to the table limit).
    fn set_title(&mut self, wid: WindowId, title: &str);

    /// Destroys every window owned by `owner`. Called by the kernel when a
    /// task exits or is killed.
    fn close_owned_by(&mut self, owner: Pid);

    /// The window holding keyboard focus, if any.
    fn focused(&self) -> Option<WindowId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_buffer_geometry() {
        let buf = SharedBuffer::new(200, 122);
        assert_eq!(buf.pixels.borrow().len(), 200 * 122);
    }

    #[test]
    fn test_shared_buffer_put_pixel_bounds() {
        let buf = SharedBuffer::new(4, 4);
        buf.put_pixel(3, 3, 0xFF0000);
        buf.put_pixel(4, 0, 0x00FF00); // out of bounds, ignored
        assert_eq!(buf.pixels.borrow()[3 * 4 + 3], 0xFF0000);
        assert!(!buf.pixels.borrow().contains(&0x00FF00));
    }

    #[test]
    fn test_shared_buffer_aliases_pixels() {
        let server_side = SharedBuffer::new(2, 2);
        let program_side = server_side.clone();
        program_side.put_pixel(0, 0, 0x112233);
        assert_eq!(server_side.pixels.borrow()[0], 0x112233);
    }
}
