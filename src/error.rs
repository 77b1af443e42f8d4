use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a candidate cannot be written as an inline mention token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("mention label is empty")]
    EmptyLabel,
    #[error("mention label {label:?} contains ']'")]
    LabelContainsBracket { label: String },
    #[error("mention identifier is empty")]
    EmptyIdentifier,
    #[error("mention identifier {identifier:?} contains ')'")]
    IdentifierContainsParen { identifier: String },
}

/// Failures of the document lookup service. The candidate source swallows
/// these into an empty result; they only ever reach the log.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("lookup service at {url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("lookup response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("message sink i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("message could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
