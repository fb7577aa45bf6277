//! Client error types.

use std::fmt;

use easyhybrid_core::CoreError;
use easyhybrid_sync::SyncError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Invalid command-line input.
    Usage(String),
    /// Local data error.
    Data(CoreError),
    /// Sync or sign-in error.
    Sync(SyncError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Usage(msg) => write!(f, "{}", msg),
            Self::Data(err) => write!(f, "{}", err),
            Self::Sync(err) => write!(f, "sync error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(err) => Some(err),
            Self::Sync(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        Self::Data(err)
    }
}

impl From<SyncError> for ClientError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}
