//! Screen-space rectangles

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen coordinates.
///
/// `x`/`y` may be negative while a window is dragged partly off screen;
/// width and height are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// True if the point lies inside the rectangle (half-open on the
    /// right/bottom edges).
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let r = Rect::new(10, 10, 100, 50);
        assert!(r.contains(10, 10));
        assert!(r.contains(109, 59));
        assert!(!r.contains(110, 10));
        assert!(!r.contains(10, 60));
        assert!(!r.contains(9, 10));
    }
}
