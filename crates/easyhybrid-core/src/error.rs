//! Core error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the local store, the data model and export/import.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Filesystem failure.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored or imported document is not valid JSON for its type.
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A target rate outside 1..=100.
    #[error("invalid target rate {0}, expected a percentage between 1 and 100")]
    InvalidTarget(String),

    /// The data directory could not be determined or prepared.
    #[error("store error: {0}")]
    Store(String),

    /// A `pass::` or `env::` secret reference could not be resolved.
    #[error("secret error: {0}")]
    Secret(String),
}

impl CoreError {
    /// Creates an IO error bound to the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error describing what was being decoded.
    pub fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }
}
