//! # Terminal emulator core
//!
//! The stdio side of a terminal program: a scrollback ring plus a key
//! queue, exposed to hosted children through the [`StdioHooks`] contract.
//! The hosting program installs a shared handle to a [`Terminal`] before
//! spawning its child; from then on the child's console output lands in
//! the scrollback and its `getc` drains keys the terminal fed in from its
//! window events. Rendering the scrollback into a window buffer is the
//! hosting program's business — this crate owns only the character model.

use core_types::keys;
use kernel_api::StdioHooks;
use std::collections::VecDeque;

/// Rows of scrollback retained before the oldest line is recycled.
pub const SCROLLBACK_ROWS: usize = 500;

/// The character model of one terminal: fixed-width rows in a bounded
/// ring, a cursor column on the bottom row, and a queue of keys waiting
/// for the hosted program.
pub struct Terminal {
    cols: usize,
    lines: VecDeque<String>,
    keys: VecDeque<i32>,
}

impl Terminal {
    pub fn new(cols: usize) -> Self {
        let mut lines = VecDeque::with_capacity(SCROLLBACK_ROWS);
        lines.push_back(String::new());
        Self {
            cols,
            lines,
            keys: VecDeque::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Feeds one key from the terminal's window events into the queue the
    /// hosted program drains through `getc`.
    pub fn push_key(&mut self, code: i32) {
        self.keys.push_back(code);
    }

    /// Feeds each byte of `s` as a printable key.
    pub fn push_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.keys.push_back(b as i32);
        }
    }

    fn newline(&mut self) {
        if self.lines.len() >= SCROLLBACK_ROWS {
            self.lines.pop_front();
        }
        self.lines.push_back(String::new());
    }

    fn current_line(&mut self) -> &mut String {
        if self.lines.is_empty() {
            self.lines.push_back(String::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Number of scrollback rows currently held.
    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    /// A scrollback row, oldest first.
    pub fn row(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|s| s.as_str())
    }

    /// The most recent `n` rows, for rendering into a window.
    pub fn tail(&self, n: usize) -> Vec<&str> {
        let start = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(start).map(|s| s.as_str()).collect()
    }
}

impl StdioHooks for Terminal {
    fn putc(&mut self, c: u8) {
        match c {
            b'\n' => self.newline(),
            b'\r' => self.current_line().clear(),
            0x08 => {
                self.current_line().pop();
            }
            c if (0x20..0x7F).contains(&c) => {
                let cols = self.cols;
                if self.current_line().len() >= cols {
                    self.newline();
                }
                self.current_line().push(c as char);
            }
            _ => {}
        }
    }

    fn getc(&mut self) -> Option<i32> {
        self.keys.pop_front()
    }

    fn has_key(&self) -> bool {
        !self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puts_lands_in_scrollback() {
        let mut term = Terminal::new(80);
        term.puts("ok\n");
        assert_eq!(term.row(0), Some("ok"));
        assert_eq!(term.row_count(), 2);
    }

    #[test]
    fn test_keys_drain_fifo() {
        let mut term = Terminal::new(80);
        term.push_str("ls");
        term.push_key(keys::ENTER);
        assert!(term.has_key());
        assert_eq!(term.getc(), Some('l' as i32));
        assert_eq!(term.getc(), Some('s' as i32));
        assert_eq!(term.getc(), Some(keys::ENTER));
        assert_eq!(term.getc(), None);
        assert!(!term.has_key());
    }

    #[test]
    fn test_backspace_erases() {
        let mut term = Terminal::new(80);
        term.puts("ab");
        term.putc(0x08);
        term.puts("c");
        assert_eq!(term.row(0), Some("ac"));
    }

    #[test]
    fn test_long_line_wraps_at_cols() {
        let mut term = Terminal::new(4);
        term.puts("abcdef");
        assert_eq!(term.row(0), Some("abcd"));
        assert_eq!(term.row(1), Some("ef"));
    }

    #[test]
    fn test_scrollback_bounded() {
        let mut term = Terminal::new(80);
        for i in 0..SCROLLBACK_ROWS + 10 {
            term.puts(&format!("line {i}\n"));
        }
        assert_eq!(term.row_count(), SCROLLBACK_ROWS);
        // The oldest rows were recycled.
        assert!(term.row(0).unwrap().starts_with("line "));
        assert_ne!(term.row(0), Some("line 0"));
    }

    #[test]
    fn test_tail_returns_newest_rows() {
        let mut term = Terminal::new(80);
        term.puts("one\ntwo\nthree");
        let tail = term.tail(2);
        assert_eq!(tail, vec!["two", "three"]);
    }
}
