//! Keyboard collaborator
//!
//! Keys arrive already translated to the shared integer encoding:
//! printable ASCII passes through unchanged, specials use `0x100..=0x108`
//! (see `core_types::keys`). Scancode translation is the driver's problem,
//! not the core's.

use std::collections::VecDeque;

/// Keyboard device: a non-blocking queue of translated key codes.
pub trait KeyboardDevice {
    /// Dequeues the next key, or `None` when the queue is empty.
    fn poll_key(&mut self) -> Option<i32>;

    /// True when `poll_key` would return a key.
    fn has_key(&self) -> bool;
}

/// A keyboard fed from a script. Tests push keys; the kernel drains them
/// through the same trait a hardware driver would implement.
#[derive(Default)]
pub struct ScriptedKeyboard {
    queue: VecDeque<i32>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, code: i32) {
        self.queue.push_back(code);
    }

    /// Pushes each byte of `s` as a printable key.
    pub fn push_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.queue.push_back(b as i32);
        }
    }
}

impl KeyboardDevice for ScriptedKeyboard {
    fn poll_key(&mut self) -> Option<i32> {
        self.queue.pop_front()
    }

    fn has_key(&self) -> bool {
        !self.queue.is_empty()
    }
}

// Shared handle: lets a test keep feeding a keyboard the kernel owns.
impl<K: KeyboardDevice> KeyboardDevice for std::rc::Rc<std::cell::RefCell<K>> {
    fn poll_key(&mut self) -> Option<i32> {
        self.borrow_mut().poll_key()
    }

    fn has_key(&self) -> bool {
        self.borrow().has_key()
    }
}
