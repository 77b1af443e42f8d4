//! The composer owns the raw buffer and caret and drives the suggestion
//! controller from every edit. Submitted buffers land in the message log and,
//! when attached, the message sink.

use chrono::{DateTime, Utc};

use crate::candidate_source::CandidateSource;
use crate::lookup::Candidate;
use crate::sink::{MessageSink, OutgoingMessage};
use crate::suggestions::{CloseReason, KeyResult, SuggestionController, SuggestionKey};
use crate::text_layout::{char_to_byte_idx, nearest_index_for_line_col, wrap_word_with_positions};
use crate::token_codec;
use crate::trigger::{self, Trigger, TriggerScope};

const MAX_LOOKUP_EVENTS_PER_POLL: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Milliseconds since the epoch, bumped to stay strictly increasing.
    pub id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled; the caller applies the key's ordinary meaning.
    Ignored,
    Consumed,
    Committed,
    Submitted,
}

pub struct Composer {
    buffer: String,
    /// Character index into `buffer`.
    caret: usize,
    caret_goal_col: Option<u16>,
    scope: TriggerScope,
    controller: SuggestionController,
    source: CandidateSource,
    messages: Vec<RenderedMessage>,
    sink: Option<Box<dyn MessageSink>>,
}

impl Composer {
    pub fn new(source: CandidateSource) -> Self {
        Self {
            buffer: String::new(),
            caret: 0,
            caret_goal_col: None,
            scope: TriggerScope::default(),
            controller: SuggestionController::new(),
            source,
            messages: Vec::new(),
            sink: None,
        }
    }

    pub fn with_scope(mut self, scope: TriggerScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn MessageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[cfg(test)]
    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn caret_line_col(&self, width: u16) -> (u16, u16) {
        let positions = wrap_word_with_positions(&self.buffer, width.max(1)).positions;
        positions
            .get(self.caret)
            .or(positions.last())
            .copied()
            .unwrap_or((0, 0))
    }

    pub fn controller(&self) -> &SuggestionController {
        &self.controller
    }

    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    pub fn is_suggesting(&self) -> bool {
        self.controller.is_open()
    }

    /// Replaces the whole buffer, as a paste or programmatic edit would.
    pub fn on_edit(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.caret = self.buffer.chars().count();
        self.caret_goal_col = None;
        self.refresh_trigger(true);
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = char_to_byte_idx(&self.buffer, self.caret);
        self.buffer.insert(byte_idx, ch);
        self.caret = self.caret.saturating_add(1);
        self.caret_goal_col = None;
        self.refresh_trigger(true);
    }

    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let start = char_to_byte_idx(&self.buffer, self.caret - 1);
        let end = char_to_byte_idx(&self.buffer, self.caret);
        self.buffer.drain(start..end);
        self.caret -= 1;
        self.caret_goal_col = None;
        self.refresh_trigger(true);
    }

    pub fn move_caret_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
        self.caret_goal_col = None;
        self.refresh_trigger(false);
    }

    pub fn move_caret_right(&mut self) {
        self.caret = (self.caret + 1).min(self.buffer.chars().count());
        self.caret_goal_col = None;
        self.refresh_trigger(false);
    }

    pub fn move_caret_up(&mut self, width: u16) {
        let positions = wrap_word_with_positions(&self.buffer, width.max(1)).positions;
        let Some(&(line, col)) = positions.get(self.caret) else {
            return;
        };
        if line == 0 {
            return;
        }
        let goal_col = self.caret_goal_col.unwrap_or(col);
        self.caret = nearest_index_for_line_col(&positions, line - 1, goal_col);
        self.caret_goal_col = Some(goal_col);
        self.refresh_trigger(false);
    }

    pub fn move_caret_down(&mut self, width: u16) {
        let positions = wrap_word_with_positions(&self.buffer, width.max(1)).positions;
        let Some(&(line, col)) = positions.get(self.caret) else {
            return;
        };
        let max_line = positions.iter().map(|(l, _)| *l).max().unwrap_or(0);
        if line >= max_line {
            return;
        }
        let goal_col = self.caret_goal_col.unwrap_or(col);
        self.caret = nearest_index_for_line_col(&positions, line + 1, goal_col);
        self.caret_goal_col = Some(goal_col);
        self.refresh_trigger(false);
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.buffer.chars().count());
        self.caret_goal_col = None;
        self.refresh_trigger(false);
    }

    /// While the list is open, Up/Down/Enter/Escape belong to it. Enter on a
    /// closed list submits.
    pub fn on_key(&mut self, key: SuggestionKey) -> KeyOutcome {
        match self.controller.handle_key(key) {
            KeyResult::Consumed => KeyOutcome::Consumed,
            KeyResult::Commit(candidate) => {
                if self.commit(&candidate) {
                    KeyOutcome::Committed
                } else {
                    KeyOutcome::Consumed
                }
            }
            KeyResult::Ignored if key == SuggestionKey::Enter => {
                if self.on_submit() {
                    KeyOutcome::Submitted
                } else {
                    KeyOutcome::Consumed
                }
            }
            KeyResult::Ignored => KeyOutcome::Ignored,
        }
    }

    pub fn on_select_candidate(&mut self, candidate: &Candidate) -> bool {
        self.controller.close(CloseReason::Committed);
        self.commit(candidate)
    }

    pub fn hover_candidate(&mut self, index: usize) {
        self.controller.hover(index);
    }

    pub fn click_candidate(&mut self, index: usize) -> bool {
        match self.controller.click(index) {
            Some(candidate) => self.on_select_candidate(&candidate),
            None => false,
        }
    }

    pub fn on_outside_click(&mut self) {
        self.controller.close(CloseReason::OutsideClick);
    }

    pub fn on_blur(&mut self) {
        self.controller.close(CloseReason::Blur);
    }

    /// Applies finished lookups. Returns whether the suggestion state changed.
    pub fn poll_lookups(&mut self) -> bool {
        let mut changed = false;
        for resolved in self.source.drain_events_limited(MAX_LOOKUP_EVENTS_PER_POLL) {
            changed |= self.controller.apply(resolved);
        }
        changed
    }

    /// Appends the buffer to the message log. Blank buffers are ignored.
    pub fn on_submit(&mut self) -> bool {
        if self.buffer.trim().is_empty() {
            return false;
        }
        self.controller.close(CloseReason::Submitted);

        let timestamp = Utc::now();
        let id = next_message_id(self.messages.last().map(|message| message.id), timestamp);
        let content = std::mem::take(&mut self.buffer);
        self.caret = 0;
        self.caret_goal_col = None;

        if let Some(sink) = self.sink.as_mut() {
            let outgoing = OutgoingMessage {
                content: content.clone(),
                timestamp,
            };
            if let Err(err) = sink.deliver(&outgoing) {
                tracing::warn!(id, error = %err, "message sink rejected message");
            }
        }
        tracing::debug!(id, mentions = token_codec::mentions(&content).len(), "message submitted");
        self.messages.push(RenderedMessage {
            id,
            content,
            timestamp,
        });
        true
    }

    fn refresh_trigger(&mut self, edited: bool) {
        let caret_byte = char_to_byte_idx(&self.buffer, self.caret);
        let detected = trigger::detect_with_scope(&self.buffer, Some(caret_byte), self.scope);
        if let Some(request) = self.controller.on_detection(&detected, edited) {
            self.source.request(request.seq, request.query);
        }
    }

    /// Splices `candidate` over the live trigger. The list is already closed
    /// by the time this runs; a failed commit leaves the buffer untouched.
    fn commit(&mut self, candidate: &Candidate) -> bool {
        let caret_byte = char_to_byte_idx(&self.buffer, self.caret);
        let Trigger::Active {
            trigger_start,
            query_end,
            ..
        } = trigger::detect_with_scope(&self.buffer, Some(caret_byte), self.scope)
        else {
            tracing::debug!(identifier = %candidate.identifier, "no live trigger to commit into");
            return false;
        };
        let token = match token_codec::encode(candidate) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(identifier = %candidate.identifier, error = %err, "cannot commit candidate");
                return false;
            }
        };
        let (buffer, caret_byte) = token_codec::splice(&self.buffer, trigger_start, query_end, &token);
        self.caret = buffer[..caret_byte].chars().count();
        self.buffer = buffer;
        self.caret_goal_col = None;
        tracing::debug!(identifier = %candidate.identifier, "mention committed");
        true
    }
}

fn next_message_id(previous: Option<u64>, now: DateTime<Utc>) -> u64 {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    match previous {
        Some(previous) if millis <= previous => previous + 1,
        _ => millis,
    }
}

#[cfg(test)]
#[path = "../tests/unit/composer_tests.rs"]
mod tests;
