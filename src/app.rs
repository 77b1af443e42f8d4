use std::time::Instant;

use crate::composer::Composer;
use crate::lookup::Document;
use crate::placeholder::{PlaceholderCycler, PlaceholderFrame};

/// Terminal-side state wrapped around the composer.
pub struct App {
    pub running: bool,
    pub ticks: u64,
    composer: Composer,
    placeholder: PlaceholderCycler,
    log_scroll: u16,
    follow_log: bool,
    preview_for: Option<String>,
    preview: Option<Document>,
}

impl App {
    pub fn new(composer: Composer, placeholder: PlaceholderCycler) -> Self {
        Self {
            running: true,
            ticks: 0,
            composer,
            placeholder,
            log_scroll: 0,
            follow_log: true,
            preview_for: None,
            preview: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.placeholder.start(now);
    }

    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
        self.placeholder.stop();
        self.composer.on_blur();
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn submit(&mut self) -> bool {
        let submitted = self.composer.on_submit();
        if submitted {
            self.follow_log = true;
        }
        submitted
    }

    /// Drains background lookups and keeps the preview in step with the
    /// highlighted candidate. Returns whether anything visible changed.
    pub fn poll_background(&mut self) -> bool {
        let mut changed = self.composer.poll_lookups();

        let highlighted = self
            .composer
            .controller()
            .active_candidate()
            .map(|candidate| candidate.identifier.clone());
        if highlighted != self.preview_for {
            self.preview = None;
            if let Some(identifier) = highlighted.as_ref() {
                self.composer.source().request_document(identifier.clone());
            }
            self.preview_for = highlighted;
            changed = true;
        }

        for fetched in self.composer.source().drain_documents() {
            if self.preview_for.as_deref() == Some(fetched.identifier.as_str()) {
                self.preview = fetched.document;
                changed = true;
            }
        }
        changed
    }

    pub fn preview(&self) -> Option<&Document> {
        self.preview.as_ref()
    }

    /// Placeholder to show in the empty input, if any.
    pub fn placeholder_frame(&self, now: Instant) -> Option<PlaceholderFrame<'_>> {
        if !self.composer.buffer().is_empty() {
            return None;
        }
        self.placeholder.frame(now)
    }

    pub fn log_scroll(&self, max_scroll: u16) -> u16 {
        if self.follow_log {
            max_scroll
        } else {
            self.log_scroll.min(max_scroll)
        }
    }

    pub fn scroll_log_up(&mut self, max_scroll: u16) {
        self.log_scroll = self.log_scroll(max_scroll).saturating_sub(1);
        self.follow_log = false;
    }

    pub fn scroll_log_down(&mut self, max_scroll: u16) {
        self.log_scroll = (self.log_scroll(max_scroll) + 1).min(max_scroll);
        self.follow_log = self.log_scroll >= max_scroll;
    }
}
