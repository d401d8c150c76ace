//! # Framebuffer
//!
//! Owned pixel memory in the system's one and only format: width × height
//! 32-bit words, each `0x00RRGGBB`, row stride equal to width.
//!
//! ## Philosophy
//!
//! The framebuffer is memory, not a device. Anyone may write pixels; no
//! clipping or locking is enforced beyond staying inside the allocation.
//! The discipline that keeps the screen coherent — one compositor writes
//! the whole thing per frame — lives in the window server, not here.
//!
//! ## Double buffering
//!
//! A framebuffer is created single- or double-buffered. When
//! double-buffered, drawing targets the hidden half and `flip` publishes it
//! whole; when single-buffered, drawing is immediately visible. Callers
//! query `has_hw_double_buffer` and must work either way.

pub mod font;

pub use font::{font_data, glyph, FONT_GLYPHS, FONT_HEIGHT, FONT_WIDTH};

use core_types::Pixel;
use hal::DmaEngine;

/// Pixel memory plus geometry. See the crate docs for the format.
pub struct Framebuffer {
    width: usize,
    height: usize,
    planes: Vec<Vec<u32>>,
    /// Index of the visible plane.
    visible: usize,
}

impl Framebuffer {
    /// Single-buffered: draws are immediately visible.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            planes: vec![vec![0; width * height]],
            visible: 0,
        }
    }

    /// Hardware-style double buffer: draws target the hidden plane until
    /// `flip` publishes it.
    pub fn new_double_buffered(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            planes: vec![vec![0; width * height]; 2],
            visible: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_hw_double_buffer(&self) -> bool {
        self.planes.len() == 2
    }

    /// Publishes plane `index` (0 or 1). No-op when single-buffered or the
    /// index is out of range.
    pub fn flip(&mut self, index: usize) {
        if self.has_hw_double_buffer() && index < 2 {
            self.visible = index;
        }
    }

    /// Index of the hidden plane, the one drawing should target.
    pub fn backbuffer_index(&self) -> usize {
        if self.has_hw_double_buffer() {
            1 - self.visible
        } else {
            0
        }
    }

    /// The plane reads observe (what the display scans out).
    pub fn visible_pixels(&self) -> &[u32] {
        &self.planes[self.visible]
    }

    /// The plane draws target: the backbuffer when double-buffered, the
    /// visible plane otherwise.
    pub fn draw_pixels_mut(&mut self) -> &mut [u32] {
        let idx = self.backbuffer_index();
        &mut self.planes[idx]
    }

    /// Reads one visible pixel; 0 outside the screen.
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        if x < self.width && y < self.height {
            self.visible_pixels()[y * self.width + x]
        } else {
            0
        }
    }

    /// Writes one pixel to the draw target; off-screen writes are dropped.
    pub fn put_pixel(&mut self, x: usize, y: usize, color: Pixel) {
        if x < self.width && y < self.height {
            let w = self.width;
            self.draw_pixels_mut()[y * w + x] = color;
        }
    }

    /// Scalar rectangle fill, clamped to the screen.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Pixel) {
        let (x0, y0, x1, y1) = self.clamp_rect(x, y, w, h);
        let width = self.width;
        let pixels = self.draw_pixels_mut();
        for row in y0..y1 {
            for p in &mut pixels[row * width + x0..row * width + x1] {
                *p = color;
            }
        }
    }

    /// Rectangle fill through the DMA engine when present, scalar
    /// otherwise. Both paths produce identical words.
    pub fn fill_rect_dma(
        &mut self,
        dma: &mut dyn DmaEngine,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Pixel,
    ) {
        if !dma.available() {
            self.fill_rect(x, y, w, h, color);
            return;
        }
        let (x0, y0, x1, y1) = self.clamp_rect(x, y, w, h);
        let width = self.width;
        let pixels = self.draw_pixels_mut();
        for row in y0..y1 {
            dma.fill(&mut pixels[row * width + x0..row * width + x1], color);
        }
    }

    /// Blits a `src_w × src_h` buffer at `(x, y)` with row-wise copies.
    pub fn blit(&mut self, x: i32, y: i32, src: &[u32], src_w: usize, src_h: usize) {
        let width = self.width;
        let height = self.height;
        let pixels = self.draw_pixels_mut();
        for row in 0..src_h {
            let dy = y + row as i32;
            if dy < 0 || dy as usize >= height {
                continue;
            }
            // Clip the row against the left and right screen edges.
            let (src_start, dst_x) = if x < 0 { ((-x) as usize, 0usize) } else { (0, x as usize) };
            if src_start >= src_w || dst_x >= width {
                continue;
            }
            let n = (src_w - src_start).min(width - dst_x);
            let s0 = row * src_w + src_start;
            let d0 = dy as usize * width + dst_x;
            pixels[d0..d0 + n].copy_from_slice(&src[s0..s0 + n]);
        }
    }

    /// Draws one 8×16 glyph with opaque background.
    pub fn draw_char(&mut self, x: i32, y: i32, c: u8, fg: Pixel, bg: Pixel) {
        let bitmap = font::glyph(c);
        for (row, bits) in bitmap.iter().enumerate() {
            for col in 0..FONT_WIDTH {
                let lit = bits & (0x80 >> col) != 0;
                let px = x + col as i32;
                let py = y + row as i32;
                if px >= 0 && py >= 0 {
                    self.put_pixel(px as usize, py as usize, if lit { fg } else { bg });
                }
            }
        }
    }

    /// Draws a string left to right; no wrapping.
    pub fn draw_string(&mut self, x: i32, y: i32, s: &str, fg: Pixel, bg: Pixel) {
        for (i, b) in s.bytes().enumerate() {
            self.draw_char(x + (i * FONT_WIDTH) as i32, y, b, fg, bg);
        }
    }

    fn clamp_rect(&self, x: i32, y: i32, w: i32, h: i32) -> (usize, usize, usize, usize) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x + w).clamp(0, self.width as i32) as usize;
        let y1 = (y + h).clamp(0, self.height as i32) as usize;
        (x0.min(x1), y0.min(y1), x1, y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::SimDma;

    #[test]
    fn test_pixel_roundtrip_preserves_encoding() {
        let mut fb = Framebuffer::new(64, 48);
        fb.put_pixel(10, 20, 0x00FF0000);
        assert_eq!(fb.pixel(10, 20), 0x00FF0000);
    }

    #[test]
    fn test_offscreen_writes_dropped() {
        let mut fb = Framebuffer::new(8, 8);
        fb.put_pixel(8, 0, 0x123456);
        fb.put_pixel(0, 100, 0x123456);
        assert!(fb.visible_pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_fill_rect_clamps_to_screen() {
        let mut fb = Framebuffer::new(16, 16);
        fb.fill_rect(-4, -4, 8, 8, 0x112233);
        assert_eq!(fb.pixel(0, 0), 0x112233);
        assert_eq!(fb.pixel(3, 3), 0x112233);
        assert_eq!(fb.pixel(4, 4), 0);
    }

    #[test]
    fn test_dma_fill_matches_scalar() {
        let mut scalar = Framebuffer::new(32, 32);
        scalar.fill_rect(0, 0, 32, 32, 0x00112233);

        let mut dma_fb = Framebuffer::new(32, 32);
        let mut dma = SimDma::new();
        dma_fb.fill_rect_dma(&mut dma, 0, 0, 32, 32, 0x00112233);

        assert_eq!(scalar.visible_pixels(), dma_fb.visible_pixels());
    }

    #[test]
    fn test_dma_absent_falls_back() {
        let mut fb = Framebuffer::new(32, 32);
        let mut dma = SimDma::absent();
        fb.fill_rect_dma(&mut dma, 0, 0, 32, 32, 0x00112233);
        assert!(fb.visible_pixels().iter().all(|&p| p == 0x00112233));
    }

    #[test]
    fn test_double_buffer_publishes_on_flip() {
        let mut fb = Framebuffer::new_double_buffered(4, 4);
        assert!(fb.has_hw_double_buffer());
        let back = fb.backbuffer_index();
        fb.put_pixel(0, 0, 0xABCDEF);
        // Hidden until the flip
        assert_eq!(fb.pixel(0, 0), 0);
        fb.flip(back);
        assert_eq!(fb.pixel(0, 0), 0xABCDEF);
    }

    #[test]
    fn test_single_buffer_draws_direct() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(!fb.has_hw_double_buffer());
        fb.put_pixel(1, 1, 0xABCDEF);
        assert_eq!(fb.pixel(1, 1), 0xABCDEF);
    }

    #[test]
    fn test_blit_clips_negative_origin() {
        let mut fb = Framebuffer::new(8, 8);
        let src = vec![0x777777u32; 16]; // 4x4
        fb.blit(-2, -2, &src, 4, 4);
        assert_eq!(fb.pixel(0, 0), 0x777777);
        assert_eq!(fb.pixel(1, 1), 0x777777);
        assert_eq!(fb.pixel(2, 2), 0);
    }

    #[test]
    fn test_draw_char_paints_cell() {
        let mut fb = Framebuffer::new(16, 32);
        fb.draw_char(0, 0, b'A', 0xFFFFFF, 0x000000);
        // Row 2 of 'A' is 0x10: the peak pixel at column 3
        assert_eq!(fb.pixel(3, 2), 0xFFFFFF);
        assert_eq!(fb.pixel(0, 2), 0x000000);
    }
}
