//! Mouse collaborator
//!
//! Position is in screen pixels, clamped to the screen by the driver.
//! Buttons are the shared bitmask (`core_types::MouseButtons`). Deltas
//! accumulate between polls so a slow consumer sees total movement, not
//! the last packet.

use core_types::MouseButtons;

/// Pointing device contract.
pub trait MouseDevice {
    fn pos(&self) -> (i32, i32);
    fn buttons(&self) -> MouseButtons;

    /// Warps the cursor (used by the desktop to clamp to the screen).
    fn set_pos(&mut self, x: i32, y: i32);

    /// Movement accumulated since the previous call; resets on read.
    fn take_delta(&mut self) -> (i32, i32);

    /// True when state changed since the previous `poll`.
    fn poll(&mut self) -> bool;
}

/// Scriptable mouse for the simulated boot.
#[derive(Default)]
pub struct SimMouse {
    x: i32,
    y: i32,
    buttons: MouseButtons,
    delta: (i32, i32),
    changed: bool,
}

impl SimMouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates movement to an absolute position.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.delta.0 += x - self.x;
        self.delta.1 += y - self.y;
        self.x = x;
        self.y = y;
        self.changed = true;
    }

    pub fn set_buttons(&mut self, buttons: MouseButtons) {
        self.buttons = buttons;
        self.changed = true;
    }
}

// Shared handle: lets a test keep driving a mouse the kernel owns.
impl<M: MouseDevice> MouseDevice for std::rc::Rc<std::cell::RefCell<M>> {
    fn pos(&self) -> (i32, i32) {
        self.borrow().pos()
    }

    fn buttons(&self) -> MouseButtons {
        self.borrow().buttons()
    }

    fn set_pos(&mut self, x: i32, y: i32) {
        self.borrow_mut().set_pos(x, y)
    }

    fn take_delta(&mut self) -> (i32, i32) {
        self.borrow_mut().take_delta()
    }

    fn poll(&mut self) -> bool {
        self.borrow_mut().poll()
    }
}

impl MouseDevice for SimMouse {
    fn pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    fn take_delta(&mut self) -> (i32, i32) {
        std::mem::take(&mut self.delta)
    }

    fn poll(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_accumulates_until_read() {
        let mut mouse = SimMouse::new();
        mouse.move_to(10, 5);
        mouse.move_to(15, 9);
        assert_eq!(mouse.take_delta(), (15, 9));
        assert_eq!(mouse.take_delta(), (0, 0));
    }

    #[test]
    fn test_poll_reports_change_once() {
        let mut mouse = SimMouse::new();
        assert!(!mouse.poll());
        mouse.set_buttons(MouseButtons::LEFT);
        assert!(mouse.poll());
        assert!(!mouse.poll());
        assert_eq!(mouse.buttons(), MouseButtons::LEFT);
    }
}
