use std::ops::Range;

/// Scroll position over the display buffer.
///
/// `offset` always stays within `0..=max_offset()`. Auto-scroll pins the view
/// to the bottom as lines arrive; any manual move leaves it on exactly when the
/// move lands on the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    auto_scroll: bool,
    width: usize,
    height: usize,
    line_count: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            offset: 0,
            auto_scroll: true,
            width,
            height,
            line_count: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn max_offset(&self) -> usize {
        self.line_count.saturating_sub(self.height)
    }

    /// Row range of the buffer currently visible.
    pub fn visible_range(&self) -> Range<usize> {
        let end = self.offset.saturating_add(self.height).min(self.line_count);
        self.offset.min(end)..end
    }

    /// Track a new buffer length; follows the bottom while auto-scroll is on.
    pub fn set_line_count(&mut self, line_count: usize) {
        self.line_count = line_count;
        if self.auto_scroll {
            self.offset = self.max_offset();
        } else {
            self.clamp();
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        if self.auto_scroll {
            self.offset = self.max_offset();
        } else {
            self.clamp();
        }
    }

    pub fn scroll_up(&mut self) {
        self.move_to(self.offset.saturating_sub(1));
    }

    pub fn scroll_down(&mut self) {
        self.move_to(self.offset.saturating_add(1));
    }

    pub fn page_up(&mut self) {
        self.move_to(self.offset.saturating_sub(self.page_size()));
    }

    pub fn page_down(&mut self) {
        self.move_to(self.offset.saturating_add(self.page_size()));
    }

    pub fn jump_top(&mut self) {
        self.move_to(0);
    }

    pub fn jump_bottom(&mut self) {
        self.move_to(self.max_offset());
    }

    fn page_size(&self) -> usize {
        self.height.max(1)
    }

    fn move_to(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
        self.auto_scroll = self.offset == self.max_offset();
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
