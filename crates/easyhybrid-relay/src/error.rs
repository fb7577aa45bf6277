//! Relay startup errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("GITHUB_CLIENT_SECRET is not set")]
    MissingSecret,

    #[error("invalid RELAY_ADDR '{0}'")]
    InvalidAddr(String),

    #[error("failed to resolve client secret: {0}")]
    Secret(#[from] easyhybrid_core::CoreError),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to initialize tracing: {0}")]
    Tracing(#[from] easyhybrid_core::TracingError),
}

pub type RelayResult<T> = Result<T, RelayError>;
