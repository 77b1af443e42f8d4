use std::time::{Duration, Instant};

pub const FADE: Duration = Duration::from_millis(220);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderPhase {
    Steady,
    FadingOut,
    Arriving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderFrame<'a> {
    pub text: &'a str,
    pub phase: PlaceholderPhase,
}

/// Free-running placeholder rotation. Each interval boundary fades the
/// current text out, swaps it, then fades the next one in.
#[derive(Debug, Clone)]
pub struct PlaceholderCycler {
    placeholders: Vec<String>,
    interval: Duration,
    started_at: Option<Instant>,
}

impl PlaceholderCycler {
    pub fn new(placeholders: Vec<String>, interval: Duration) -> Self {
        // A cycle shorter than both fades would never show steady text.
        let interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval.max(FADE * 2 + Duration::from_millis(1))
        };
        Self {
            placeholders,
            interval,
            started_at: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn frame(&self, now: Instant) -> Option<PlaceholderFrame<'_>> {
        let count = self.placeholders.len();
        let first = self.placeholders.first()?;
        let Some(started_at) = self.started_at.filter(|_| count > 1) else {
            return Some(PlaceholderFrame {
                text: first,
                phase: PlaceholderPhase::Steady,
            });
        };

        let elapsed = now.saturating_duration_since(started_at).as_millis();
        let interval = self.interval.as_millis();
        let fade = FADE.as_millis();
        let cycle = elapsed / interval;
        let offset = elapsed % interval;
        let index = |cycle: u128| (cycle % count as u128) as usize;

        let (slot, phase) = if cycle == 0 || offset >= fade * 2 {
            (index(cycle), PlaceholderPhase::Steady)
        } else if offset < fade {
            (index(cycle - 1), PlaceholderPhase::FadingOut)
        } else {
            (index(cycle), PlaceholderPhase::Arriving)
        };
        Some(PlaceholderFrame {
            text: &self.placeholders[slot],
            phase,
        })
    }
}
