//! Error types for sync and authentication.

use std::fmt;

use easyhybrid_core::CoreError;
use thiserror::Error;

/// The category of a sync error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorCode {
    /// The token was rejected by GitHub or the OAuth exchange failed.
    InvalidToken,
    /// GitHub answered with a non-success status.
    RemoteError,
    /// Sync is disabled or no gist is bound.
    NotConfigured,
    /// The remote document is missing or not valid JSON.
    ParseError,
    /// The OAuth state parameter did not match.
    CsrfSuspected,
    /// The request never got an answer.
    NetworkFailure,
    /// Local store failure or unexpected state.
    Internal,
}

impl SyncErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::RemoteError => "remote_error",
            Self::NotConfigured => "not_configured",
            Self::ParseError => "parse_error",
            Self::CsrfSuspected => "csrf_suspected",
            Self::NetworkFailure => "network_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for SyncErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by the sync or OAuth services.
#[derive(Debug, Error)]
pub struct SyncError {
    code: SyncErrorCode,
    message: String,
    /// HTTP status of the failed remote call, if any.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SyncError {
    pub fn new(code: SyncErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::InvalidToken, message)
    }

    /// Creates a remote error; the status is appended to the message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(
            SyncErrorCode::RemoteError,
            format!("{} (HTTP {})", message.into(), status),
        );
        err.status = Some(status);
        err
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::NotConfigured, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::ParseError, message)
    }

    pub fn csrf(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::CsrfSuspected, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::NetworkFailure, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SyncErrorCode::Internal, message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> SyncErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        Self::internal(format!("local store: {}", err)).with_source(err)
    }
}

/// A specialized Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
