//! Optional capability contracts
//!
//! The original API table carried nullable entries for subsystems owned by
//! programs outside the core: TrueType rendering, the Windows-executable
//! host, the FTP server and the WiFi radio. The Rust rendering keeps the
//! slots — traits registered into the kernel at runtime, exactly like the
//! window server — and every call through the facade degrades to its
//! sentinel (false / 0 / −1 / `None`) until an implementation registers.

use serde::{Deserialize, Serialize};

/// TTF style selector: `NORMAL`, `BOLD`, `ITALIC` or `BOLD | ITALIC`.
pub mod ttf_style {
    pub const NORMAL: i32 = 0;
    pub const BOLD: i32 = 1;
    pub const ITALIC: i32 = 2;
}

/// One rasterized glyph: a grayscale alpha bitmap plus placement metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    /// `width * height` coverage values, 0 transparent to 255 opaque.
    pub bitmap: Vec<u8>,
    pub width: i32,
    pub height: i32,
    /// Offset from the pen position to the bitmap origin.
    pub xoff: i32,
    pub yoff: i32,
    /// Horizontal pen advance after this glyph.
    pub advance: i32,
}

/// Vertical metrics for one font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
}

/// A TrueType rasterizer. Glyphs are cached by the engine; callers treat
/// the returned bitmap as read-only.
pub trait TtfEngine {
    fn glyph(&mut self, codepoint: i32, size: i32, style: i32) -> Option<Glyph>;
    fn advance(&mut self, codepoint: i32, size: i32) -> i32;
    fn kerning(&mut self, left: i32, right: i32, size: i32) -> i32;
    fn metrics(&mut self, size: i32) -> FontMetrics;
}

/// Host for Windows executables (x86 emulation in the original system).
pub trait WinExecHost {
    /// Runs the executable at `path` to completion; its exit code.
    fn run(&mut self, path: &str) -> i32;
}

/// An FTP server owned by a user program; the kernel only forwards calls.
pub trait FtpServer {
    fn start(&mut self, port: u16);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// One service step, called from the owning program's main loop.
    fn poll(&mut self);
}

/// The WiFi radio, where the platform has one.
pub trait WifiRadio {
    fn enable(&mut self) -> bool;
    fn disable(&mut self) -> bool;
    fn is_enabled(&self) -> bool;
    fn connect(&mut self, ssid: &str, passphrase: &str) -> bool;
    fn disconnect(&mut self);
    /// SSID of the current association, if any.
    fn connected_ssid(&self) -> Option<String>;
    fn mac(&self) -> [u8; 6];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_bitmap_geometry() {
        let g = Glyph {
            bitmap: vec![0; 8 * 16],
            width: 8,
            height: 16,
            xoff: 0,
            yoff: -12,
            advance: 9,
        };
        assert_eq!(g.bitmap.len(), (g.width * g.height) as usize);
    }

    #[test]
    fn test_ttf_style_combines() {
        assert_eq!(ttf_style::BOLD | ttf_style::ITALIC, 3);
    }
}
