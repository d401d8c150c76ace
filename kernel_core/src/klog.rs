//! Kernel log ring
//!
//! A circular byte buffer that records kernel diagnostics from boot
//! onward. Readers address it by logical offset from the oldest retained
//! byte, so a `dmesg`-style program can page through it incrementally and
//! keep working as the ring wraps.

use std::fmt;

/// Severity prefix for kernel log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// The ring itself.
pub struct Klog {
    buffer: Vec<u8>,
    /// Next write position.
    head: usize,
    /// Total bytes ever written; `min(total, capacity)` is readable.
    total: u64,
}

impl Klog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            head: 0,
            total: 0,
        }
    }

    pub fn putc(&mut self, c: u8) {
        let cap = self.buffer.len();
        self.buffer[self.head] = c;
        self.head = (self.head + 1) % cap;
        self.total += 1;
    }

    pub fn write(&mut self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }

    /// Appends one `[LEVEL] message` line.
    pub fn log(&mut self, level: LogLevel, message: &str) {
        self.write(&format!("[{}] {}\n", level, message));
    }

    /// Bytes currently retained.
    pub fn size(&self) -> usize {
        (self.total.min(self.buffer.len() as u64)) as usize
    }

    /// Copies retained bytes starting at logical `offset` (0 = oldest)
    /// into `buf`; returns the number of bytes copied.
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> usize {
        let log_size = self.size();
        if offset >= log_size || buf.is_empty() {
            return 0;
        }
        let n = buf.len().min(log_size - offset);
        let cap = self.buffer.len();
        // Once wrapped, the oldest byte sits at the write head.
        let start = if self.total > cap as u64 {
            (self.head + offset) % cap
        } else {
            offset
        };
        for (i, out) in buf.iter_mut().take(n).enumerate() {
            *out = self.buffer[(start + i) % cap];
        }
        n
    }

    /// The whole retained log as a string, for tests and panic banners.
    pub fn contents(&self) -> String {
        let mut buf = vec![0; self.size()];
        self.read(0, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let mut klog = Klog::new(64);
        klog.log(LogLevel::Info, "boot");
        assert_eq!(klog.contents(), "[INFO] boot\n");
        assert_eq!(klog.size(), 12);
    }

    #[test]
    fn test_read_at_offset() {
        let mut klog = Klog::new(64);
        klog.write("abcdef");
        let mut buf = [0u8; 3];
        assert_eq!(klog.read(2, &mut buf), 3);
        assert_eq!(&buf, b"cde");
    }

    #[test]
    fn test_wrap_keeps_newest_bytes() {
        let mut klog = Klog::new(8);
        klog.write("0123456789"); // 10 bytes into an 8-byte ring
        assert_eq!(klog.size(), 8);
        assert_eq!(klog.contents(), "23456789");
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let mut klog = Klog::new(16);
        klog.write("abc");
        let mut buf = [0u8; 4];
        assert_eq!(klog.read(3, &mut buf), 0);
        assert_eq!(klog.read(10, &mut buf), 0);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
