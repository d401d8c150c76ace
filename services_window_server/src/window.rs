//! Window-table slot and per-window event ring

use core_types::{Pid, Rect, WindowEvent, EVENT_QUEUE_DEPTH, TITLE_BAR_HEIGHT, TITLE_MAX};
use kernel_api::SharedBuffer;
use std::collections::VecDeque;

/// Bounded FIFO of pending events. On overflow the incoming event is
/// dropped and the counter increments; consumers treat the queue as lossy.
#[derive(Default)]
pub struct EventRing {
    queue: VecDeque<WindowEvent>,
    dropped: u64,
}

impl EventRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: WindowEvent) {
        if self.queue.len() >= EVENT_QUEUE_DEPTH {
            self.dropped += 1;
            return;
        }
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<WindowEvent> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Events discarded because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// One live window.
pub struct WindowSlot {
    pub owner: Pid,
    pub rect: Rect,
    pub title: String,
    /// Content pixels, `w × (h - TITLE_BAR_HEIGHT)`. The server side of
    /// the counted handle; owners hold clones.
    pub buffer: SharedBuffer,
    pub events: EventRing,
    pub dirty: bool,
    pub minimized: bool,
    pub maximized: bool,
    /// Geometry to return to after maximize.
    pub saved_rect: Option<Rect>,
}

impl WindowSlot {
    pub fn new(owner: Pid, rect: Rect, title: &str) -> Self {
        let mut title = title.to_string();
        title.truncate(TITLE_MAX - 1);
        Self {
            owner,
            rect,
            title,
            buffer: SharedBuffer::new(rect.w.max(0) as usize, content_height(rect.h)),
            events: EventRing::new(),
            dirty: true,
            minimized: false,
            maximized: false,
            saved_rect: None,
        }
    }

    /// Swaps in a fresh content buffer for the current geometry. The old
    /// handle keeps working against orphaned pixels until re-fetched.
    pub fn realloc_buffer(&mut self) {
        self.buffer = SharedBuffer::new(self.rect.w.max(0) as usize, content_height(self.rect.h));
        self.dirty = true;
    }
}

/// Content rows below the title bar; zero when the window is shorter than
/// the bar itself.
pub fn content_height(h: i32) -> usize {
    (h - TITLE_BAR_HEIGHT).max(0) as usize
}
