//! Keyword side menu: a selectable index of slide titles.
//!
//! Purely a projection over the slide registry. Slides without a keyword
//! entry are skipped, except in authoring mode where a placeholder row is
//! substituted so editor users can still reach every slide.

use std::time::Duration;

use crate::registry::SlideRegistry;

/// Placeholder title used in authoring mode for keywordless slides.
pub const UNTITLED: &str = "No title";

/// Default scroll-into-view animation. Hosts on platforms with known
/// animation jank set this to zero for an instant scroll.
pub const SCROLL_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMenuItem {
    pub title: String,
    pub subtitles: Vec<String>,
    pub slide_index: usize,
}

pub struct KeywordMenu {
    items: Vec<KeywordMenuItem>,
    current_slide: usize,
    open: bool,
    scroll_duration: Duration,
    /// Item ordinal the view should scroll into view, consumed by the host.
    pending_scroll: Option<usize>,
}

impl KeywordMenu {
    pub fn build(registry: &SlideRegistry, editor_mode: bool) -> Self {
        let mut items = Vec::new();
        for index in 0..registry.count() {
            if registry.is_summary(index) {
                continue;
            }
            let slide = registry.slide(index);
            match slide.keywords.first() {
                Some(entry) => items.push(KeywordMenuItem {
                    title: entry.main.clone(),
                    subtitles: entry.subs.clone(),
                    slide_index: index,
                }),
                None if editor_mode => items.push(KeywordMenuItem {
                    title: UNTITLED.to_string(),
                    subtitles: Vec::new(),
                    slide_index: index,
                }),
                None => {}
            }
        }
        Self {
            items,
            current_slide: 0,
            open: false,
            scroll_duration: SCROLL_DURATION,
            pending_scroll: None,
        }
    }

    pub fn items(&self) -> &[KeywordMenuItem] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        // Bring the current row into view when the panel appears.
        self.pending_scroll = self.item_for_slide(self.current_slide);
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn scroll_duration(&self) -> Duration {
        self.scroll_duration
    }

    pub fn set_instant_scroll(&mut self) {
        self.scroll_duration = Duration::ZERO;
    }

    pub fn current_slide(&self) -> usize {
        self.current_slide
    }

    /// Item ordinal carrying the "current" marker, if the current slide has
    /// a menu row at all.
    pub fn current_item(&self) -> Option<usize> {
        self.item_for_slide(self.current_slide)
    }

    /// Update the current marker and queue a scroll-into-view.
    pub fn set_current_slide(&mut self, slide_index: usize) {
        self.current_slide = slide_index;
        if self.open {
            self.pending_scroll = self.item_for_slide(slide_index);
        }
    }

    /// Take the queued scroll target (item ordinal), if any.
    pub fn take_pending_scroll(&mut self) -> Option<usize> {
        self.pending_scroll.take()
    }

    /// Resolve a selection to a slide index. Selecting also closes the menu.
    pub fn select(&mut self, item_ordinal: usize) -> Option<usize> {
        let target = self.items.get(item_ordinal).map(|i| i.slide_index)?;
        self.close();
        Some(target)
    }

    fn item_for_slide(&self, slide_index: usize) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.slide_index == slide_index)
    }
}
