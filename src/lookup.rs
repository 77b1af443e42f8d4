use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Hard cap on the number of suggestions a query may produce.
pub const MAX_CANDIDATES: usize = 8;
pub const DESCRIPTION_MAX_CHARS: usize = 90;

/// One selectable suggestion, as shown in the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub identifier: String,
    pub display_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Candidate {
    #[cfg(test)]
    pub fn new(identifier: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_label: display_label.into(),
            description: None,
        }
    }

    #[cfg(test)]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A catalog document as stored by the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "identifier")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// The document lookup service the candidate source queries.
///
/// Implementations are called from worker threads, hence `Send + Sync`.
pub trait DocumentLookup: Send + Sync {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, LookupError>;

    fn fetch_by_id(&self, identifier: &str) -> Result<Option<Document>, LookupError>;
}

/// Static title → label table used to present friendlier document names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOverrides {
    labels: HashMap<String, String>,
}

impl DisplayOverrides {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    pub fn label_for(&self, title: &str) -> String {
        self.labels
            .get(title)
            .cloned()
            .unwrap_or_else(|| title.to_string())
    }
}

/// Collapses whitespace runs to single spaces and cuts to
/// [`DESCRIPTION_MAX_CHARS`] characters. Cuts may land mid-word.
pub fn describe(content: &str) -> Option<String> {
    let mut collapsed = String::with_capacity(content.len());
    let mut in_whitespace = false;
    for ch in content.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }
    let truncated: String = collapsed.chars().take(DESCRIPTION_MAX_CHARS).collect();
    if truncated.is_empty() {
        None
    } else {
        Some(truncated)
    }
}

pub fn shape_document(document: &Document, overrides: &DisplayOverrides) -> Candidate {
    Candidate {
        identifier: document.id.clone(),
        display_label: overrides.label_for(&document.title),
        description: describe(&document.content),
    }
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(alias = "identifier")]
    id: String,
    #[serde(alias = "displayLabel", alias = "display_label")]
    display: String,
    #[serde(default)]
    description: Option<String>,
}

impl WireCandidate {
    fn into_candidate(self) -> Candidate {
        Candidate {
            identifier: self.id,
            display_label: self.display,
            description: self.description.filter(|value| !value.is_empty()),
        }
    }
}

/// Lookup service reached over HTTP:
/// `GET {endpoint}?query=<q>&limit=<n>` and `GET {endpoint}?id=<id>`.
pub struct HttpLookup {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    fn get(&self, params: &[(&str, &str)]) -> Result<ureq::Response, LookupError> {
        let mut request = self.agent.get(&self.endpoint);
        for (key, value) in params {
            request = request.query(key, value);
        }
        request.call().map_err(|err| match err {
            ureq::Error::Status(status, _) => LookupError::Status {
                url: self.endpoint.clone(),
                status,
            },
            ureq::Error::Transport(transport) => LookupError::Transport {
                url: self.endpoint.clone(),
                message: transport.to_string(),
            },
        })
    }
}

impl DocumentLookup for HttpLookup {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, LookupError> {
        let limit = limit.to_string();
        let response = self.get(&[("query", query), ("limit", limit.as_str())])?;
        let wire: Vec<WireCandidate> = response
            .into_json()
            .map_err(|err| LookupError::Decode(err.to_string()))?;
        Ok(wire.into_iter().map(WireCandidate::into_candidate).collect())
    }

    fn fetch_by_id(&self, identifier: &str) -> Result<Option<Document>, LookupError> {
        let response = self.get(&[("id", identifier)])?;
        response
            .into_json::<Option<Document>>()
            .map_err(|err| LookupError::Decode(err.to_string()))
    }
}
