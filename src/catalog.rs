use std::path::Path;

use crate::artifact_io::read_text_file;
use crate::error::{CatalogError, LookupError};
use crate::lookup::{shape_document, Candidate, DisplayOverrides, Document, DocumentLookup};
use crate::token_codec;

/// Lookup service backed by documents held in memory.
///
/// Matches when the query is a substring of the title or the content; the
/// empty query matches every document. Results are ordered by display label.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    documents: Vec<Document>,
    overrides: DisplayOverrides,
    case_sensitive: bool,
}

impl InMemoryCatalog {
    pub fn new(documents: Vec<Document>, overrides: DisplayOverrides) -> Self {
        Self {
            documents,
            overrides,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Loads a JSON array of `{id, title, content}` objects.
    pub fn load(path: &Path, overrides: DisplayOverrides) -> Result<Self, CatalogError> {
        let text = read_text_file(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let documents: Vec<Document> =
            serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(count = documents.len(), path = %path.display(), "catalog loaded");
        Ok(Self::new(documents, overrides))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    fn matches(&self, document: &Document, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        if self.case_sensitive {
            document.title.contains(query) || document.content.contains(query)
        } else {
            let needle = query.to_ascii_lowercase();
            document.title.to_ascii_lowercase().contains(&needle)
                || document.content.to_ascii_lowercase().contains(&needle)
        }
    }
}

impl DocumentLookup for InMemoryCatalog {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, LookupError> {
        let mut candidates: Vec<Candidate> = self
            .documents
            .iter()
            .filter(|document| self.matches(document, query))
            .map(|document| shape_document(document, &self.overrides))
            .filter(|candidate| {
                token_codec::validate(&candidate.display_label, &candidate.identifier).is_ok()
            })
            .collect();
        candidates.sort_by(|a, b| a.display_label.cmp(&b.display_label));
        candidates.truncate(limit);
        Ok(candidates)
    }

    fn fetch_by_id(&self, identifier: &str) -> Result<Option<Document>, LookupError> {
        Ok(self
            .documents
            .iter()
            .find(|document| document.id == identifier)
            .cloned())
    }
}
