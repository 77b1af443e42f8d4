//! Suggestion list state machine.
//!
//! The controller is either closed or showing an open session. Queries are
//! tagged with a monotonically increasing sequence number; only the answer to
//! the most recent tag is ever applied, whatever order answers arrive in.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::candidate_source::ResolvedQuery;
use crate::lookup::Candidate;
use crate::trigger::Trigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// The controller is closed; the key keeps its normal meaning.
    Ignored,
    /// Handled by the list; the input must not see it.
    Consumed,
    /// Enter picked this candidate; the list is already closed.
    Commit(Candidate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Inactive,
    NoResults,
    Escape,
    Committed,
    OutsideClick,
    Blur,
    Submitted,
}

/// Counts attached outside-click listeners. A listener stays attached for as
/// long as its [`ListenerGuard`] lives.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: Arc<AtomicUsize>,
}

impl ListenerRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self) -> ListenerGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("outside-click listener attached");
        ListenerGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ListenerGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!("outside-click listener detached");
    }
}

#[derive(Debug)]
pub struct SuggestionSession {
    query: String,
    candidates: Vec<Candidate>,
    active_index: usize,
    outside_click: ListenerGuard,
}

impl SuggestionSession {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_candidate(&self) -> Option<&Candidate> {
        self.candidates.get(self.active_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingQuery {
    seq: u64,
    query: String,
}

/// A query the caller must hand to the candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Default)]
pub struct SuggestionController {
    session: Option<SuggestionSession>,
    pending: Option<PendingQuery>,
    last_seq: u64,
    listeners: ListenerRegistry,
}

impl SuggestionController {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_listeners(listeners: ListenerRegistry) -> Self {
        Self {
            listeners,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Clicks outside the list are only routed here while a listener is
    /// attached.
    pub fn listens_for_outside_clicks(&self) -> bool {
        self.listeners.active() > 0
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SuggestionSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn candidates(&self) -> &[Candidate] {
        self.session
            .as_ref()
            .map(SuggestionSession::candidates)
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn active_index(&self) -> Option<usize> {
        self.session.as_ref().map(SuggestionSession::active_index)
    }

    pub fn active_candidate(&self) -> Option<&Candidate> {
        self.session.as_ref()?.active_candidate()
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.query.as_str())
    }

    /// Reacts to a fresh detection. `edited` is false for caret moves, which
    /// may close or continue a composition but never start one.
    pub fn on_detection(&mut self, trigger: &Trigger, edited: bool) -> Option<QueryRequest> {
        let Trigger::Active { query, .. } = trigger else {
            if self.is_engaged() {
                self.close(CloseReason::Inactive);
            }
            return None;
        };
        if !edited && !self.is_engaged() {
            return None;
        }
        if self.latest_query() == Some(query.as_str()) {
            return None;
        }
        self.last_seq = self.last_seq.wrapping_add(1);
        self.pending = Some(PendingQuery {
            seq: self.last_seq,
            query: query.clone(),
        });
        Some(QueryRequest {
            seq: self.last_seq,
            query: query.clone(),
        })
    }

    /// Applies an answer if it belongs to the latest issued query. Returns
    /// whether the state changed.
    pub fn apply(&mut self, resolved: ResolvedQuery) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            tracing::debug!(seq = resolved.seq, "discarding answer for closed session");
            return false;
        };
        if pending.seq != resolved.seq || pending.query != resolved.query {
            tracing::debug!(
                seq = resolved.seq,
                latest = pending.seq,
                "discarding stale candidate answer"
            );
            return false;
        }
        self.pending = None;
        if resolved.candidates.is_empty() {
            self.close(CloseReason::NoResults);
            return true;
        }
        let outside_click = match self.session.take() {
            Some(session) => session.outside_click,
            None => self.listeners.attach(),
        };
        tracing::debug!(
            query = %resolved.query,
            count = resolved.candidates.len(),
            "suggestion list open"
        );
        self.session = Some(SuggestionSession {
            query: resolved.query,
            candidates: resolved.candidates,
            active_index: 0,
            outside_click,
        });
        true
    }

    pub fn handle_key(&mut self, key: SuggestionKey) -> KeyResult {
        let Some(session) = self.session.as_mut() else {
            return KeyResult::Ignored;
        };
        let len = session.candidates.len();
        match key {
            SuggestionKey::Down => {
                session.active_index = (session.active_index + 1) % len;
                KeyResult::Consumed
            }
            SuggestionKey::Up => {
                session.active_index = (session.active_index + len - 1) % len;
                KeyResult::Consumed
            }
            SuggestionKey::Enter => match self.take_candidate(None) {
                Some(candidate) => KeyResult::Commit(candidate),
                None => KeyResult::Consumed,
            },
            SuggestionKey::Escape => {
                self.close(CloseReason::Escape);
                KeyResult::Consumed
            }
        }
    }

    pub fn hover(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut()
            && index < session.candidates.len()
        {
            session.active_index = index;
        }
    }

    /// Picks the row at `index`, closing the list.
    pub fn click(&mut self, index: usize) -> Option<Candidate> {
        self.take_candidate(Some(index))
    }

    pub fn close(&mut self, reason: CloseReason) {
        if self.session.is_some() || self.pending.is_some() {
            tracing::debug!(?reason, "suggestion list closed");
        }
        self.session = None;
        self.pending = None;
    }

    fn take_candidate(&mut self, index: Option<usize>) -> Option<Candidate> {
        let session = self.session.as_ref()?;
        let index = index.unwrap_or(session.active_index);
        let candidate = session.candidates.get(index)?.clone();
        self.close(CloseReason::Committed);
        Some(candidate)
    }

    fn is_engaged(&self) -> bool {
        self.session.is_some() || self.pending.is_some()
    }

    fn latest_query(&self) -> Option<&str> {
        match (&self.pending, &self.session) {
            (Some(pending), _) => Some(pending.query.as_str()),
            (None, Some(session)) => Some(session.query.as_str()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/suggestions_tests.rs"]
mod tests;
