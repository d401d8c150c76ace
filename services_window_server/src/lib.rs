//! # Desktop window server
//!
//! The runtime-registered implementation of the kernel's windowing slot:
//! a fixed window table, front-first z-order, exclusive focus, per-window
//! event rings and the compositor support the desktop's redraw loop uses.
//!
//! ## Philosophy
//!
//! **The server owns the pixels; programs own the drawing.**
//!
//! Every window's content buffer is allocated and freed here. Programs
//! receive a counted handle onto the same pixels and draw whenever they
//! like; the compositor blits whatever is there on the next dirty cycle.
//! Input flows the other way: the desktop's input loop feeds global mouse
//! and keyboard state into [`DesktopWindowServer::handle_mouse`] /
//! [`DesktopWindowServer::handle_key`], and the server translates it into
//! per-window events — title-bar hits become drag/close/minimize/maximize
//! without ever reaching the owning program.

pub mod window;

pub use window::{content_height, EventRing, WindowSlot};

use core_types::{
    rgb, MouseButtons, Pid, Pixel, Rect, WindowEvent, WindowEventKind, WindowId, MAX_WINDOWS,
    TITLE_BAR_HEIGHT, TITLE_MAX, WHITE,
};
use framebuffer::Framebuffer;
use hal::DmaEngine;
use kernel_api::{SharedBuffer, WindowServer};

const WALLPAPER: Pixel = 0x2E6B8A;
const TITLE_FOCUSED: Pixel = 0x3A3A50;
const TITLE_UNFOCUSED: Pixel = 0x6E6E7A;
const CLOSE_BOX: Pixel = 0xC0392B;

/// Width of each title-bar button, measured from the right edge: close,
/// then maximize, then minimize.
const BUTTON_W: i32 = TITLE_BAR_HEIGHT;

/// In-flight title-bar drag: which window and the grab offset from its
/// origin.
struct Drag {
    wid: WindowId,
    dx: i32,
    dy: i32,
}

/// The desktop's window server. One instance, installed into the kernel at
/// desktop startup; all calls run synchronously on the calling task.
pub struct DesktopWindowServer {
    slots: Vec<Option<WindowSlot>>,
    /// Front-most first.
    z_order: Vec<WindowId>,
    focus: Option<WindowId>,
    screen_w: i32,
    screen_h: i32,
    /// Previous global button state, for edge detection.
    buttons: MouseButtons,
    drag: Option<Drag>,
}

impl DesktopWindowServer {
    pub fn new(screen_w: usize, screen_h: usize) -> Self {
        Self {
            slots: (0..MAX_WINDOWS).map(|_| None).collect(),
            z_order: Vec::new(),
            focus: None,
            screen_w: screen_w as i32,
            screen_h: screen_h as i32,
            buttons: MouseButtons::empty(),
            drag: None,
        }
    }

    fn slot(&self, wid: WindowId) -> Option<&WindowSlot> {
        self.slots.get(wid.index())?.as_ref()
    }

    fn slot_mut(&mut self, wid: WindowId) -> Option<&mut WindowSlot> {
        self.slots.get_mut(wid.index())?.as_mut()
    }

    fn push_event(&mut self, wid: WindowId, event: WindowEvent) {
        if let Some(slot) = self.slot_mut(wid) {
            slot.events.push(event);
        }
    }

    /// Moves focus, delivering the Unfocus/Focus bracket.
    fn set_focus(&mut self, wid: Option<WindowId>) {
        if self.focus == wid {
            return;
        }
        if let Some(old) = self.focus {
            self.push_event(old, WindowEvent::plain(WindowEventKind::Unfocus));
            if let Some(slot) = self.slot_mut(old) {
                slot.dirty = true;
            }
        }
        self.focus = wid;
        if let Some(new) = wid {
            self.push_event(new, WindowEvent::plain(WindowEventKind::Focus));
            if let Some(slot) = self.slot_mut(new) {
                slot.dirty = true;
            }
        }
    }

    /// Front-most non-minimized window, the focus fallback after a
    /// destroy or minimize.
    fn front_candidate(&self) -> Option<WindowId> {
        self.z_order
            .iter()
            .copied()
            .find(|&wid| self.slot(wid).map(|s| !s.minimized).unwrap_or(false))
    }

    fn bring_to_front(&mut self, wid: WindowId) {
        self.z_order.retain(|&w| w != wid);
        self.z_order.insert(0, wid);
    }

    /// Front-most non-minimized window containing the point.
    fn hit_test(&self, x: i32, y: i32) -> Option<WindowId> {
        self.z_order.iter().copied().find(|&wid| {
            self.slot(wid)
                .map(|s| !s.minimized && s.rect.contains(x, y))
                .unwrap_or(false)
        })
    }

    /// Feeds one sample of global mouse state. A down edge on any button
    /// drives hit testing, focus and title-bar chrome; moves drive
    /// dragging and window-local MouseMove; up edges end drags. Event
    /// `data3` always carries the current button mask.
    pub fn handle_mouse(&mut self, x: i32, y: i32, buttons: MouseButtons) {
        let pressed = buttons - self.buttons;
        let released = self.buttons - buttons;
        self.buttons = buttons;

        if !pressed.is_empty() {
            self.handle_mouse_down(x, y, buttons, pressed.contains(MouseButtons::LEFT));
        } else if !released.is_empty() {
            if released.contains(MouseButtons::LEFT) {
                self.drag = None;
            }
            if let Some(wid) = self.hit_test(x, y) {
                if let Some(local) = self.to_content(wid, x, y) {
                    self.push_event(
                        wid,
                        WindowEvent::mouse(
                            WindowEventKind::MouseUp,
                            local.0,
                            local.1,
                            buttons.bits(),
                        ),
                    );
                }
            }
        } else if let Some(drag) = &self.drag {
            let (wid, dx, dy) = (drag.wid, drag.dx, drag.dy);
            if let Some(slot) = self.slot_mut(wid) {
                slot.rect.x = x - dx;
                slot.rect.y = y - dy;
                slot.dirty = true;
            }
        } else if let Some(wid) = self.hit_test(x, y) {
            if let Some(local) = self.to_content(wid, x, y) {
                self.push_event(
                    wid,
                    WindowEvent::mouse(
                        WindowEventKind::MouseMove,
                        local.0,
                        local.1,
                        buttons.bits(),
                    ),
                );
            }
        }
    }

    fn handle_mouse_down(&mut self, x: i32, y: i32, buttons: MouseButtons, primary: bool) {
        // Clicks on the wallpaper change nothing.
        let Some(wid) = self.hit_test(x, y) else {
            return;
        };
        self.bring_to_front(wid);
        self.set_focus(Some(wid));
        let rect = match self.slot(wid) {
            Some(s) => s.rect,
            None => return,
        };
        if y < rect.y + TITLE_BAR_HEIGHT {
            // Chrome answers to the primary button only.
            if !primary {
                return;
            }
            // Buttons from the right edge, then drag anywhere else.
            let from_right = rect.x + rect.w - x;
            if from_right <= BUTTON_W {
                self.push_event(wid, WindowEvent::plain(WindowEventKind::Close));
            } else if from_right <= 2 * BUTTON_W {
                self.toggle_maximize(wid);
            } else if from_right <= 3 * BUTTON_W {
                self.minimize(wid);
            } else {
                self.drag = Some(Drag {
                    wid,
                    dx: x - rect.x,
                    dy: y - rect.y,
                });
            }
        } else if let Some(local) = self.to_content(wid, x, y) {
            self.push_event(
                wid,
                WindowEvent::mouse(WindowEventKind::MouseDown, local.0, local.1, buttons.bits()),
            );
        }
    }

    /// Routes a keystroke to the focused window.
    pub fn handle_key(&mut self, code: i32) {
        if let Some(wid) = self.focus {
            self.push_event(wid, WindowEvent::key(code));
        }
    }

    /// Window-local content coordinates, or `None` in the title bar.
    fn to_content(&self, wid: WindowId, x: i32, y: i32) -> Option<(i32, i32)> {
        let rect = self.slot(wid)?.rect;
        let ly = y - rect.y - TITLE_BAR_HEIGHT;
        if ly < 0 {
            return None;
        }
        Some((x - rect.x, ly))
    }

    /// Hides the window; focus falls to the next front-most candidate.
    pub fn minimize(&mut self, wid: WindowId) {
        if let Some(slot) = self.slot_mut(wid) {
            slot.minimized = true;
            slot.dirty = true;
        }
        if self.focus == Some(wid) {
            let next = self.front_candidate();
            self.set_focus(next);
        }
    }

    /// Unhides and refocuses a minimized window.
    pub fn unminimize(&mut self, wid: WindowId) {
        if let Some(slot) = self.slot_mut(wid) {
            slot.minimized = false;
            slot.dirty = true;
        }
        self.bring_to_front(wid);
        self.set_focus(Some(wid));
    }

    /// Maximize to full screen, or restore the saved rectangle. Either way
    /// the content buffer is reallocated and a Resize is delivered.
    pub fn toggle_maximize(&mut self, wid: WindowId) {
        let (screen_w, screen_h) = (self.screen_w, self.screen_h);
        let Some(slot) = self.slot_mut(wid) else {
            return;
        };
        if slot.maximized {
            if let Some(saved) = slot.saved_rect.take() {
                slot.rect = saved;
            }
            slot.maximized = false;
        } else {
            slot.saved_rect = Some(slot.rect);
            slot.rect = Rect::new(0, 0, screen_w, screen_h);
            slot.maximized = true;
        }
        slot.realloc_buffer();
        let (w, h) = (slot.rect.w, slot.rect.h - TITLE_BAR_HEIGHT);
        self.push_event(wid, WindowEvent::resize(w, h));
    }

    /// Resizes in place (user drag of a corner). Reallocates and delivers
    /// Resize, same as maximize.
    pub fn resize(&mut self, wid: WindowId, w: i32, h: i32) {
        let Some(slot) = self.slot_mut(wid) else {
            return;
        };
        slot.rect.w = w;
        slot.rect.h = h;
        slot.realloc_buffer();
        self.push_event(wid, WindowEvent::resize(w, h - TITLE_BAR_HEIGHT));
    }

    /// True when some window needs recompositing.
    pub fn any_dirty(&self) -> bool {
        self.z_order
            .iter()
            .any(|&wid| self.slot(wid).map(|s| s.dirty).unwrap_or(false))
    }

    /// One compositor cycle: wallpaper, then every non-minimized window
    /// back-to-front (chrome, then content blit — DMA 2-D copy when the
    /// engine is present and the window is fully on screen, row-wise copy
    /// otherwise). Skips entirely when nothing is dirty. Returns whether a
    /// repaint happened.
    pub fn composite(&mut self, fb: &mut Framebuffer, dma: &mut dyn DmaEngine) -> bool {
        if !self.any_dirty() {
            return false;
        }
        fb.fill_rect_dma(dma, 0, 0, fb.width() as i32, fb.height() as i32, WALLPAPER);
        let order: Vec<WindowId> = self.z_order.clone();
        for &wid in order.iter().rev() {
            let Some(slot) = self.slot(wid) else { continue };
            if slot.minimized {
                continue;
            }
            let rect = slot.rect;
            let focused = self.focus == Some(wid);
            let title = slot.title.clone();
            let buffer = slot.buffer.clone();

            // Chrome: title bar, caption, buttons.
            let bar = if focused { TITLE_FOCUSED } else { TITLE_UNFOCUSED };
            fb.fill_rect_dma(dma, rect.x, rect.y, rect.w, TITLE_BAR_HEIGHT, bar);
            fb.draw_string(rect.x + 6, rect.y + 6, &title, WHITE, bar);
            fb.fill_rect_dma(
                dma,
                rect.x + rect.w - BUTTON_W,
                rect.y,
                BUTTON_W,
                TITLE_BAR_HEIGHT,
                CLOSE_BOX,
            );
            fb.fill_rect_dma(
                dma,
                rect.x + rect.w - 2 * BUTTON_W,
                rect.y,
                BUTTON_W,
                TITLE_BAR_HEIGHT,
                rgb(0x60, 0x60, 0x60),
            );
            fb.fill_rect_dma(
                dma,
                rect.x + rect.w - 3 * BUTTON_W,
                rect.y,
                BUTTON_W,
                TITLE_BAR_HEIGHT,
                rgb(0x80, 0x80, 0x80),
            );

            // Content.
            let cx = rect.x;
            let cy = rect.y + TITLE_BAR_HEIGHT;
            let pixels = buffer.pixels.borrow();
            let fully_on_screen = cx >= 0
                && cy >= 0
                && cx + buffer.width as i32 <= fb.width() as i32
                && cy + buffer.height as i32 <= fb.height() as i32;
            if dma.available() && fully_on_screen {
                let stride = fb.width();
                dma.copy_2d(
                    fb.draw_pixels_mut(),
                    stride,
                    cx as usize,
                    cy as usize,
                    &pixels,
                    buffer.width,
                    buffer.width,
                    buffer.height,
                );
            } else {
                fb.blit(cx, cy, &pixels, buffer.width, buffer.height);
            }
        }
        for slot in self.slots.iter_mut().flatten() {
            slot.dirty = false;
        }
        true
    }

    /// Windows currently minimized, for the desktop's dock.
    pub fn minimized_windows(&self) -> Vec<(WindowId, String)> {
        (0..MAX_WINDOWS)
            .filter_map(|i| {
                let slot = self.slots[i].as_ref()?;
                if slot.minimized {
                    Some((WindowId(i), slot.title.clone()))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Events discarded on `wid`'s full ring since creation.
    pub fn dropped_events(&self, wid: WindowId) -> u64 {
        self.slot(wid).map(|s| s.events.dropped()).unwrap_or(0)
    }

    pub fn window_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn title_of(&self, wid: WindowId) -> Option<String> {
        self.slot(wid).map(|s| s.title.clone())
    }

    pub fn rect_of(&self, wid: WindowId) -> Option<Rect> {
        self.slot(wid).map(|s| s.rect)
    }
}

impl WindowServer for DesktopWindowServer {
    fn create(&mut self, owner: Pid, rect: Rect, title: &str) -> Option<WindowId> {
        let idx = self.slots.iter().position(|s| s.is_none())?;
        self.slots[idx] = Some(WindowSlot::new(owner, rect, title));
        let wid = WindowId(idx);
        self.bring_to_front(wid);
        self.set_focus(Some(wid));
        Some(wid)
    }

    fn destroy(&mut self, wid: WindowId) {
        if self
            .slots
            .get_mut(wid.index())
            .and_then(|s| s.take())
            .is_none()
        {
            return;
        }
        self.z_order.retain(|&w| w != wid);
        if self.drag.as_ref().map(|d| d.wid) == Some(wid) {
            self.drag = None;
        }
        if self.focus == Some(wid) {
            self.focus = None;
            let next = self.front_candidate();
            self.set_focus(next);
        }
    }

    fn buffer(&self, wid: WindowId) -> Option<SharedBuffer> {
        self.slot(wid).map(|s| s.buffer.clone())
    }

    fn poll_event(&mut self, wid: WindowId) -> Option<WindowEvent> {
        self.slot_mut(wid)?.events.pop()
    }

    fn invalidate(&mut self, wid: WindowId) {
        if let Some(slot) = self.slot_mut(wid) {
            slot.dirty = true;
        }
    }

    fn set_title(&mut self, wid: WindowId, title: &str) {
        if let Some(slot) = self.slot_mut(wid) {
            let mut title = title.to_string();
            title.truncate(TITLE_MAX - 1);
            slot.title = title;
            slot.dirty = true;
        }
    }

    fn close_owned_by(&mut self, owner: Pid) {
        let owned: Vec<WindowId> = (0..MAX_WINDOWS)
            .filter(|&i| {
                self.slots[i]
                    .as_ref()
                    .map(|s| s.owner == owner)
                    .unwrap_or(false)
            })
            .map(WindowId)
            .collect();
        for wid in owned {
            self.destroy(wid);
        }
    }

    fn focused(&self) -> Option<WindowId> {
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> DesktopWindowServer {
        DesktopWindowServer::new(640, 480)
    }

    #[test]
    fn test_create_fronts_and_focuses() {
        let mut ws = server();
        let a = ws.create(Pid(1), Rect::new(10, 10, 200, 150), "A").unwrap();
        let b = ws.create(Pid(1), Rect::new(50, 50, 200, 150), "B").unwrap();
        assert_eq!(ws.focused(), Some(b));
        // A saw Focus then Unfocus; B saw Focus.
        assert_eq!(
            ws.poll_event(a).map(|e| e.kind),
            Some(WindowEventKind::Focus)
        );
        assert_eq!(
            ws.poll_event(a).map(|e| e.kind),
            Some(WindowEventKind::Unfocus)
        );
        assert_eq!(
            ws.poll_event(b).map(|e| e.kind),
            Some(WindowEventKind::Focus)
        );
    }

    #[test]
    fn test_table_exhaustion() {
        let mut ws = server();
        for i in 0..MAX_WINDOWS {
            assert!(ws
                .create(Pid(1), Rect::new(0, 0, 50, 50), &format!("w{i}"))
                .is_some());
        }
        assert!(ws.create(Pid(1), Rect::new(0, 0, 50, 50), "extra").is_none());
    }

    #[test]
    fn test_destroy_invalidates_buffer_lookup() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(10, 10, 200, 150), "T").unwrap();
        let buf = ws.buffer(wid).unwrap();
        assert_eq!(buf.width, 200);
        assert_eq!(buf.height, (150 - TITLE_BAR_HEIGHT) as usize);
        ws.destroy(wid);
        assert!(ws.buffer(wid).is_none());
        ws.destroy(wid); // second destroy is a no-op
    }

    #[test]
    fn test_mouse_down_in_content_delivers_local_coords() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        ws.handle_mouse(150, 160, MouseButtons::LEFT);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::MouseDown);
        assert_eq!(ev.data1, 50);
        assert_eq!(ev.data2, 160 - 100 - TITLE_BAR_HEIGHT);
        assert_eq!(ev.data3, MouseButtons::LEFT.bits() as i32);
    }

    #[test]
    fn test_mouse_down_transfers_focus_and_fronts() {
        let mut ws = server();
        let a = ws.create(Pid(1), Rect::new(0, 0, 100, 100), "A").unwrap();
        let b = ws.create(Pid(1), Rect::new(200, 200, 100, 100), "B").unwrap();
        assert_eq!(ws.focused(), Some(b));
        ws.handle_mouse(50, 50, MouseButtons::LEFT);
        assert_eq!(ws.focused(), Some(a));
        assert_eq!(ws.hit_test(50, 50), Some(a));
    }

    #[test]
    fn test_right_click_delivers_mouse_down() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        ws.handle_mouse(150, 160, MouseButtons::RIGHT);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::MouseDown);
        assert_eq!(ev.data1, 50);
        assert_eq!(ev.data2, 160 - 100 - TITLE_BAR_HEIGHT);
        assert_eq!(ev.data3, MouseButtons::RIGHT.bits() as i32);
    }

    #[test]
    fn test_right_click_transfers_focus() {
        let mut ws = server();
        let a = ws.create(Pid(1), Rect::new(0, 0, 100, 100), "A").unwrap();
        let b = ws.create(Pid(1), Rect::new(200, 200, 100, 100), "B").unwrap();
        assert_eq!(ws.focused(), Some(b));
        ws.handle_mouse(50, 50, MouseButtons::RIGHT);
        assert_eq!(ws.focused(), Some(a));
        assert_eq!(ws.hit_test(50, 50), Some(a));
    }

    #[test]
    fn test_right_click_on_chrome_takes_no_action() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        // Right-click the close box: no Close, no drag, window intact.
        ws.handle_mouse(100 + 200 - 5, 105, MouseButtons::RIGHT);
        assert!(ws.poll_event(wid).is_none());
        ws.handle_mouse(150, 130, MouseButtons::RIGHT);
        assert_eq!(ws.rect_of(wid).unwrap(), Rect::new(100, 100, 200, 150));
    }

    #[test]
    fn test_mouse_up_carries_held_button_mask() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        ws.handle_mouse(150, 160, MouseButtons::LEFT | MouseButtons::RIGHT);
        while ws.poll_event(wid).is_some() {}
        // Release left; right stays held and shows up in the mask.
        ws.handle_mouse(150, 160, MouseButtons::RIGHT);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::MouseUp);
        assert_eq!(ev.data3, MouseButtons::RIGHT.bits() as i32);
    }

    #[test]
    fn test_title_bar_drag_moves_window() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        ws.handle_mouse(110, 110, MouseButtons::LEFT); // grab the bar
        ws.handle_mouse(160, 140, MouseButtons::LEFT); // drag
        ws.handle_mouse(160, 140, MouseButtons::empty()); // release
        let rect = ws.rect_of(wid).unwrap();
        assert_eq!((rect.x, rect.y), (150, 130));
    }

    #[test]
    fn test_close_button_enqueues_close() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(100, 100, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        // Top-right corner of the title bar.
        ws.handle_mouse(100 + 200 - 5, 105, MouseButtons::LEFT);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::Close);
        // The window still exists until the owner acknowledges.
        assert!(ws.buffer(wid).is_some());
    }

    #[test]
    fn test_key_goes_to_focus() {
        let mut ws = server();
        let a = ws.create(Pid(1), Rect::new(0, 0, 100, 100), "A").unwrap();
        let b = ws.create(Pid(1), Rect::new(200, 0, 100, 100), "B").unwrap();
        while ws.poll_event(a).is_some() {}
        while ws.poll_event(b).is_some() {}
        ws.handle_key('x' as i32);
        assert!(ws.poll_event(a).is_none());
        let ev = ws.poll_event(b).unwrap();
        assert_eq!(ev.kind, WindowEventKind::Key);
        assert_eq!(ev.data1, 'x' as i32);
    }

    #[test]
    fn test_maximize_restore_resizes_buffer() {
        let mut ws = server();
        let wid = ws.create(Pid(1), Rect::new(10, 10, 200, 150), "T").unwrap();
        while ws.poll_event(wid).is_some() {}
        ws.toggle_maximize(wid);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!(ev.kind, WindowEventKind::Resize);
        assert_eq!((ev.data1, ev.data2), (640, 480 - TITLE_BAR_HEIGHT));
        assert_eq!(ws.buffer(wid).unwrap().width, 640);

        ws.toggle_maximize(wid);
        let ev = ws.poll_event(wid).unwrap();
        assert_eq!((ev.data1, ev.data2), (200, 150 - TITLE_BAR_HEIGHT));
        assert_eq!(ws.rect_of(wid).unwrap(), Rect::new(10, 10, 200, 150));
    }

    #[test]
    fn test_minimize_passes_focus() {
        let mut ws = server();
        let a = ws.create(Pid(1), Rect::new(0, 0, 100, 100), "A").unwrap();
        let b = ws.create(Pid(1), Rect::new(200, 0, 100, 100), "B").unwrap();
        ws.minimize(b);
        assert_eq!(ws.focused(), Some(a));
        assert_eq!(ws.minimized_windows(), vec![(b, "B".to_string())]);
        ws.unminimize(b);
        assert_eq!(ws.focused(), Some(b));
    }

    #[test]
    fn test_close_owned_by_sweeps() {
        let mut ws = server();
        let a = ws.create(Pid(3), Rect::new(0, 0, 100, 100), "A").unwrap();
        let b = ws.create(Pid(4), Rect::new(0, 0, 100, 100), "B").unwrap();
        let c = ws.create(Pid(3), Rect::new(0, 0, 100, 100), "C").unwrap();
        ws.close_owned_by(Pid(3));
        assert!(ws.buffer(a).is_none());
        assert!(ws.buffer(c).is_none());
        assert!(ws.buffer(b).is_some());
        assert_eq!(ws.focused(), Some(b));
    }

    #[test]
    fn test_composite_skips_when_clean() {
        let mut ws = server();
        let mut fb = Framebuffer::new(640, 480);
        let mut dma = hal::SimDma::new();
        let wid = ws.create(Pid(1), Rect::new(10, 10, 200, 150), "T").unwrap();
        assert!(ws.composite(&mut fb, &mut dma));
        assert!(!ws.composite(&mut fb, &mut dma));
        ws.invalidate(wid);
        assert!(ws.composite(&mut fb, &mut dma));
    }

    #[test]
    fn test_composite_blits_content() {
        let mut ws = server();
        let mut fb = Framebuffer::new(640, 480);
        let mut dma = hal::SimDma::new();
        let wid = ws.create(Pid(1), Rect::new(10, 10, 200, 150), "T").unwrap();
        let buf = ws.buffer(wid).unwrap();
        buf.fill(0x00FF00);
        ws.invalidate(wid);
        ws.composite(&mut fb, &mut dma);
        // Just below the title bar.
        assert_eq!(fb.pixel(10, (10 + TITLE_BAR_HEIGHT) as usize), 0x00FF00);
        // Wallpaper outside any window.
        assert_eq!(fb.pixel(639, 479), WALLPAPER);
    }

    #[test]
    fn test_composite_scalar_matches_dma() {
        let mut draw = |dma: &mut hal::SimDma| {
            let mut ws = server();
            let mut fb = Framebuffer::new(640, 480);
            let wid = ws.create(Pid(1), Rect::new(30, 40, 120, 90), "T").unwrap();
            ws.buffer(wid).unwrap().fill(0xAA55AA);
            ws.composite(&mut fb, dma);
            fb.visible_pixels().to_vec()
        };
        let with_dma = draw(&mut hal::SimDma::new());
        let without = draw(&mut hal::SimDma::absent());
        assert_eq!(with_dma, without);
    }
}
