//! Text console
//!
//! A character grid in front of the framebuffer: the cell size is the 8×16
//! font cell, so a 640×480 screen gives 80×30. Output lands in the grid
//! immediately; rendering to pixels happens on demand so headless tests can
//! assert on characters instead of bitmaps.

use core_types::{Pixel, WHITE};
use framebuffer::{Framebuffer, FONT_HEIGHT, FONT_WIDTH};

#[derive(Clone, Copy)]
struct Cell {
    ch: u8,
    color: Pixel,
}

const BLANK: Cell = Cell {
    ch: b' ',
    color: WHITE,
};

pub struct Console {
    cols: usize,
    rows: usize,
    cursor_x: usize,
    cursor_y: usize,
    cursor_enabled: bool,
    color: Pixel,
    cells: Vec<Cell>,
}

impl Console {
    pub fn new(fb_width: usize, fb_height: usize) -> Self {
        let cols = fb_width / FONT_WIDTH;
        let rows = fb_height / FONT_HEIGHT;
        Self {
            cols,
            rows,
            cursor_x: 0,
            cursor_y: 0,
            cursor_enabled: true,
            color: WHITE,
            cells: vec![BLANK; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn set_color(&mut self, color: Pixel) {
        self.color = color;
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor_x = x.min(self.cols.saturating_sub(1));
        self.cursor_y = y.min(self.rows.saturating_sub(1));
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn set_cursor_enabled(&mut self, enabled: bool) {
        self.cursor_enabled = enabled;
    }

    pub fn putc(&mut self, c: u8) {
        match c {
            b'\n' => {
                self.cursor_x = 0;
                self.cursor_y += 1;
            }
            b'\r' => self.cursor_x = 0,
            // Backspace erases the previous cell on the line
            0x08 => {
                if self.cursor_x > 0 {
                    self.cursor_x -= 1;
                    self.cells[self.cursor_y * self.cols + self.cursor_x] = BLANK;
                }
            }
            b'\t' => {
                self.cursor_x = (self.cursor_x / 8 + 1) * 8;
                if self.cursor_x >= self.cols {
                    self.cursor_x = 0;
                    self.cursor_y += 1;
                }
            }
            c => {
                self.cells[self.cursor_y * self.cols + self.cursor_x] = Cell {
                    ch: c,
                    color: self.color,
                };
                self.cursor_x += 1;
                if self.cursor_x >= self.cols {
                    self.cursor_x = 0;
                    self.cursor_y += 1;
                }
            }
        }
        if self.cursor_y >= self.rows {
            self.scroll_up();
            self.cursor_y = self.rows - 1;
        }
    }

    pub fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    /// Blanks from the cursor to the end of the current row.
    pub fn clear_to_eol(&mut self) {
        let row = self.cursor_y * self.cols;
        for cell in &mut self.cells[row + self.cursor_x..row + self.cols] {
            *cell = BLANK;
        }
    }

    /// Blanks a cell rectangle, clamped to the grid.
    pub fn clear_region(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for row in y..(y + h).min(self.rows) {
            for col in x..(x + w).min(self.cols) {
                self.cells[row * self.cols + col] = BLANK;
            }
        }
    }

    /// Character at a cell, for tests. Blank off the grid.
    pub fn char_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.cols || y >= self.rows {
            return BLANK.ch;
        }
        self.cells[y * self.cols + x].ch
    }

    /// One row as a trimmed string, for tests. Empty off the grid.
    pub fn line(&self, y: usize) -> String {
        if y >= self.rows {
            return String::new();
        }
        let row = &self.cells[y * self.cols..(y + 1) * self.cols];
        let s: String = row.iter().map(|c| c.ch as char).collect();
        s.trim_end().to_string()
    }

    /// Paints the whole grid into the framebuffer.
    pub fn render(&self, fb: &mut Framebuffer) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = self.cells[row * self.cols + col];
                fb.draw_char(
                    (col * FONT_WIDTH) as i32,
                    (row * FONT_HEIGHT) as i32,
                    cell.ch,
                    cell.color,
                    0,
                );
            }
        }
        if self.cursor_enabled {
            fb.fill_rect(
                (self.cursor_x * FONT_WIDTH) as i32,
                (self.cursor_y * FONT_HEIGHT + FONT_HEIGHT - 2) as i32,
                FONT_WIDTH as i32,
                2,
                self.color,
            );
        }
    }

    fn scroll_up(&mut self) {
        self.cells.copy_within(self.cols.., 0);
        let last = (self.rows - 1) * self.cols;
        self.cells[last..].fill(BLANK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        // 80x30 grid
        Console::new(640, 480)
    }

    #[test]
    fn test_geometry_from_font_cell() {
        let con = console();
        assert_eq!(con.cols(), 80);
        assert_eq!(con.rows(), 30);
    }

    #[test]
    fn test_puts_advances_cursor() {
        let mut con = console();
        con.puts("hi");
        assert_eq!(con.char_at(0, 0), b'h');
        assert_eq!(con.char_at(1, 0), b'i');
        assert_eq!(con.cursor(), (2, 0));
        con.putc(b'\n');
        assert_eq!(con.cursor(), (0, 1));
    }

    #[test]
    fn test_line_wrap() {
        let mut con = console();
        con.puts(&"x".repeat(81));
        assert_eq!(con.cursor(), (1, 1));
        assert_eq!(con.char_at(0, 1), b'x');
    }

    #[test]
    fn test_scroll_discards_top_row() {
        let mut con = console();
        con.puts("first\n");
        for _ in 0..30 {
            con.puts("fill\n");
        }
        assert_eq!(con.cursor().1, 29);
        assert_ne!(con.line(0), "first");
    }

    #[test]
    fn test_backspace_erases() {
        let mut con = console();
        con.puts("ab");
        con.putc(0x08);
        assert_eq!(con.char_at(1, 0), b' ');
        assert_eq!(con.cursor(), (1, 0));
    }

    #[test]
    fn test_clear_to_eol() {
        let mut con = console();
        con.puts("abcdef");
        con.set_cursor(3, 0);
        con.clear_to_eol();
        assert_eq!(con.line(0), "abc");
    }

    #[test]
    fn test_observation_off_the_grid_is_blank() {
        let mut con = console();
        con.puts("edge");
        assert_eq!(con.char_at(80, 0), b' ');
        assert_eq!(con.char_at(0, 30), b' ');
        assert_eq!(con.line(30), "");
        assert_eq!(con.line(usize::MAX), "");
    }

    #[test]
    fn test_clear_region() {
        let mut con = console();
        con.puts("abcdef");
        con.clear_region(1, 0, 2, 1);
        assert_eq!(con.char_at(0, 0), b'a');
        assert_eq!(con.char_at(1, 0), b' ');
        assert_eq!(con.char_at(2, 0), b' ');
        assert_eq!(con.char_at(3, 0), b'd');
    }
}
