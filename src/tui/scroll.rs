// Line scrolling for the code and log panels
//
// While following, the view stays pinned to the newest lines as content
// grows. Any upward scroll stops following; reaching the bottom again resumes
// it. Content and viewport sizes are only known at draw time, so the panel
// calls `update_dimensions` every frame and the key handlers just move the
// offset.

#[derive(Debug, Clone)]
pub struct ScrollState {
    /// First visible line
    offset: usize,
    total: usize,
    viewport: usize,
    pub auto_follow: bool,
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
        }
    }

    /// Forget the previous content (new generation)
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if lines == 0 || self.offset == 0 {
            return;
        }
        self.offset = self.offset.saturating_sub(lines);
        self.auto_follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = self.max_offset() == 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = true;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible range as (start, end) line indices
    pub fn visible_range(&self) -> (usize, usize) {
        (self.offset, (self.offset + self.viewport).min(self.total))
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.total > self.viewport
    }

    /// How far the content can scroll
    pub fn scrollable_lines(&self) -> usize {
        self.max_offset()
    }

    /// Keep one line of context when paging
    fn page(&self) -> usize {
        self.viewport.saturating_sub(1).max(1)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_growing_content() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(3, 10);
        assert_eq!(scroll.offset(), 0);

        scroll.update_dimensions(25, 10);
        assert_eq!(scroll.offset(), 15);
        assert_eq!(scroll.visible_range(), (15, 25));
    }

    #[test]
    fn test_scrolling_up_stops_following() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(25, 10);

        scroll.scroll_up(5);
        assert!(!scroll.auto_follow);
        scroll.update_dimensions(40, 10);
        assert_eq!(scroll.offset(), 10);
    }

    #[test]
    fn test_reaching_bottom_resumes_following() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(25, 10);
        scroll.page_up();
        assert_eq!(scroll.offset(), 6);

        scroll.page_down();
        assert!(scroll.auto_follow);
        scroll.update_dimensions(30, 10);
        assert_eq!(scroll.offset(), 20);
    }

    #[test]
    fn test_offset_clamped_when_content_shrinks() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(50, 10);
        scroll.scroll_to_top();
        scroll.scroll_down(30);
        scroll.update_dimensions(20, 10);
        assert_eq!(scroll.offset(), 10);
    }

    #[test]
    fn test_reset_follows_again() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(50, 10);
        scroll.scroll_to_top();
        assert!(!scroll.auto_follow);

        scroll.reset();
        assert!(scroll.auto_follow);
        assert_eq!(scroll.offset(), 0);
    }
}
