use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artifact_io::append_line;
use crate::error::SinkError;

/// What a submitted message looks like to whoever consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

pub trait MessageSink {
    fn deliver(&mut self, message: &OutgoingMessage) -> Result<(), SinkError>;
}

/// Appends one JSON object per message to a file.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MessageSink for JsonlSink {
    fn deliver(&mut self, message: &OutgoingMessage) -> Result<(), SinkError> {
        let line = serde_json::to_string(message)?;
        append_line(&self.path, &line)?;
        Ok(())
    }
}
