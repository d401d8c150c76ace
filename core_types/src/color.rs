//! Framebuffer pixel format and named colors
//!
//! Every pixel is a 32-bit word `0x00RRGGBB`; the top byte is ignored.

/// A framebuffer pixel value.
pub type Pixel = u32;

pub const BLACK: Pixel = 0x000000;
pub const WHITE: Pixel = 0xFFFFFF;
pub const RED: Pixel = 0xFF0000;
pub const GREEN: Pixel = 0x00FF00;
pub const BLUE: Pixel = 0x0000FF;
pub const CYAN: Pixel = 0x00FFFF;
pub const MAGENTA: Pixel = 0xFF00FF;
pub const YELLOW: Pixel = 0xFFFF00;
pub const AMBER: Pixel = 0xFFBF00;

/// Builds a pixel from 8-bit channels.
pub fn rgb(r: u8, g: u8, b: u8) -> Pixel {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_packing() {
        assert_eq!(rgb(0xFF, 0x00, 0x00), RED);
        assert_eq!(rgb(0xFF, 0xBF, 0x00), AMBER);
        assert_eq!(rgb(0x11, 0x22, 0x33), 0x112233);
    }
}
