//! Stdio hook installation
//!
//! The kernel keeps a stack of installed hook sets. Installing pushes;
//! restoring pops. Every console helper consults the top of the stack
//! first and falls back to the raw device when the stack is empty, which
//! is exactly the save-and-restore discipline the original four function
//! pointers demanded of callers, enforced structurally.

use kernel_api::StdioHooks;
use std::cell::RefCell;
use std::rc::Rc;

pub type SharedHooks = Rc<RefCell<dyn StdioHooks>>;

#[derive(Default)]
pub struct StdioStack {
    stack: Vec<SharedHooks>,
}

impl StdioStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a hook set; it stays active until `restore`.
    pub fn install(&mut self, hooks: SharedHooks) {
        self.stack.push(hooks);
    }

    /// Uninstalls the most recent hook set, reactivating the previous one
    /// (or the raw console). Returns it so the installer can drain state.
    pub fn restore(&mut self) -> Option<SharedHooks> {
        self.stack.pop()
    }

    /// The active hook set, if any.
    pub fn active(&self) -> Option<SharedHooks> {
        self.stack.last().cloned()
    }

    pub fn is_redirected(&self) -> bool {
        !self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Sink(Vec<u8>);

    impl StdioHooks for Sink {
        fn putc(&mut self, c: u8) {
            self.0.push(c);
        }

        fn getc(&mut self) -> Option<i32> {
            None
        }

        fn has_key(&self) -> bool {
            false
        }
    }

    struct Keys(VecDeque<i32>);

    impl StdioHooks for Keys {
        fn putc(&mut self, _c: u8) {}

        fn getc(&mut self) -> Option<i32> {
            self.0.pop_front()
        }

        fn has_key(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[test]
    fn test_install_restore_nesting() {
        let mut stack = StdioStack::new();
        assert!(!stack.is_redirected());

        let outer: SharedHooks = Rc::new(RefCell::new(Sink(Vec::new())));
        let inner: SharedHooks = Rc::new(RefCell::new(Keys(VecDeque::new())));
        stack.install(outer.clone());
        stack.install(inner.clone());

        assert!(Rc::ptr_eq(&stack.active().unwrap(), &inner));
        stack.restore();
        assert!(Rc::ptr_eq(&stack.active().unwrap(), &outer));
        stack.restore();
        assert!(stack.active().is_none());
    }
}
