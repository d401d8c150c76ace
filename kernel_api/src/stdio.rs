//! Redirectable console I/O
//!
//! Four overridable hooks sit in front of the raw console: put a character,
//! put a string, read a key, test for a key. Every console helper in the
//! runtime consults the installed hooks first and falls back to the raw
//! device when none are installed. A terminal emulator installs its hooks
//! before spawning a child shell and restores the previous set on exit;
//! installation nests (save-and-restore), so a terminal can host a terminal.

/// The four console hooks.
///
/// Keys returned by `getc` use the same integer encoding as the raw
/// keyboard: printable ASCII passes through, specials are `0x100..=0x108`.
pub trait StdioHooks {
    /// Consumes one output byte.
    fn putc(&mut self, c: u8);

    /// Consumes a string; the default routes through `putc` per byte.
    fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }

    /// Dequeues the next key, or `None` when no key is pending.
    fn getc(&mut self) -> Option<i32>;

    /// True when `getc` would return a key.
    fn has_key(&self) -> bool;
}
