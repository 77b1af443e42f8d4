use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::lookup::{Candidate, Document, DocumentLookup, MAX_CANDIDATES};
use crate::token_codec;

/// A finished query, tagged with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub seq: u64,
    pub query: String,
    pub candidates: Vec<Candidate>,
}

/// Answer to a background [`CandidateSource::request_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub identifier: String,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Background,
    Inline,
}

/// Fail-soft front of the document lookup service.
///
/// Every failure (error or panic in the lookup) becomes an empty candidate
/// list. Queries issued through [`CandidateSource::request`] run on a worker
/// thread and come back through [`CandidateSource::drain_events_limited`].
pub struct CandidateSource {
    lookup: Arc<dyn DocumentLookup>,
    limit: usize,
    dispatch: Dispatch,
    event_tx: Sender<ResolvedQuery>,
    event_rx: Receiver<ResolvedQuery>,
    document_tx: Sender<FetchedDocument>,
    document_rx: Receiver<FetchedDocument>,
}

impl CandidateSource {
    pub fn new(lookup: Arc<dyn DocumentLookup>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let (document_tx, document_rx) = mpsc::channel();
        Self {
            lookup,
            limit: MAX_CANDIDATES,
            dispatch: Dispatch::Background,
            event_tx,
            event_rx,
            document_tx,
            document_rx,
        }
    }

    /// Limits are clamped to `1..=MAX_CANDIDATES`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_CANDIDATES);
        self
    }

    /// Resolves requests on the calling thread. Results still arrive through
    /// the event channel.
    pub fn inline(mut self) -> Self {
        self.dispatch = Dispatch::Inline;
        self
    }

    #[cfg(test)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn search(&self, query: &str) -> Vec<Candidate> {
        search_fail_soft(self.lookup.as_ref(), query, self.limit)
    }

    #[cfg(test)]
    pub fn fetch_by_id(&self, identifier: &str) -> Option<Document> {
        fetch_fail_soft(self.lookup.as_ref(), identifier)
    }

    pub fn request(&self, seq: u64, query: String) {
        tracing::debug!(seq, %query, "candidate query issued");
        let lookup = Arc::clone(&self.lookup);
        let limit = self.limit;
        let tx = self.event_tx.clone();
        self.run_job(move || {
            let candidates = search_fail_soft(lookup.as_ref(), &query, limit);
            let _ = tx.send(ResolvedQuery {
                seq,
                query,
                candidates,
            });
        });
    }

    /// Background `fetch_by_id`; the answer arrives through
    /// [`CandidateSource::drain_documents`].
    pub fn request_document(&self, identifier: String) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.document_tx.clone();
        self.run_job(move || {
            let document = fetch_fail_soft(lookup.as_ref(), &identifier);
            let _ = tx.send(FetchedDocument {
                identifier,
                document,
            });
        });
    }

    pub fn drain_documents(&self) -> Vec<FetchedDocument> {
        self.document_rx.try_iter().collect()
    }

    fn run_job(&self, run: impl FnOnce() + Send + 'static) {
        match self.dispatch {
            Dispatch::Background => {
                thread::spawn(run);
            }
            Dispatch::Inline => run(),
        }
    }

    #[cfg(test)]
    pub fn drain_events(&self) -> Vec<ResolvedQuery> {
        self.drain_events_limited(usize::MAX)
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<ResolvedQuery> {
        let mut events = Vec::new();
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }
}

fn fetch_fail_soft(lookup: &dyn DocumentLookup, identifier: &str) -> Option<Document> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| lookup.fetch_by_id(identifier)));
    match result {
        Ok(Ok(document)) => document,
        Ok(Err(err)) => {
            tracing::warn!(%identifier, error = %err, "document fetch failed");
            None
        }
        Err(_) => {
            tracing::warn!(%identifier, "document fetch panicked");
            None
        }
    }
}

fn search_fail_soft(lookup: &dyn DocumentLookup, query: &str, limit: usize) -> Vec<Candidate> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| lookup.search(query, limit)));
    let mut candidates = match result {
        Ok(Ok(candidates)) => candidates,
        Ok(Err(err)) => {
            tracing::warn!(%query, error = %err, "candidate lookup failed");
            return Vec::new();
        }
        Err(_) => {
            tracing::warn!(%query, "candidate lookup panicked");
            return Vec::new();
        }
    };
    candidates.retain(|candidate| {
        match token_codec::validate(&candidate.display_label, &candidate.identifier) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(identifier = %candidate.identifier, error = %err, "dropping candidate");
                false
            }
        }
    });
    candidates.sort_by(|a, b| a.display_label.cmp(&b.display_label));
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
#[path = "../tests/unit/candidate_source_tests.rs"]
mod tests;
