//! GitHub Gist sync for easyhybrid.
//!
//! - [`SyncService`] backs up and restores the local data to one private gist
//! - [`OAuthService`] signs in through GitHub's authorization-code flow, with
//!   the code exchange delegated to a token relay
//! - [`AutoSyncScheduler`] re-runs the throttled auto-sync on a timer
//!
//! GitHub is reached through the [`GistApi`] and [`TokenRelay`] traits so the
//! services can be driven by in-memory fakes.

pub mod config;
pub mod document;
pub mod error;
pub mod gist;
pub mod oauth;
pub mod scheduler;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{DEFAULT_COOLDOWN, SyncConfig, SyncStatus};
pub use document::{DOCUMENT_VERSION, GIST_DESCRIPTION, GIST_FILENAME, GistDocument};
pub use error::{SyncError, SyncErrorCode, SyncResult};
pub use gist::{BoxFuture, Gist, GistApi, GistFile, GitHubClient, GitHubUser};
pub use oauth::{
    AuthOutcome, AuthSuccess, CallbackParams, HttpTokenRelay, LoopbackReceiver, OAuthConfig,
    OAuthService, TokenRelay, TokenRequest, is_oauth_callback,
};
pub use scheduler::{AutoSyncScheduler, SchedulerConfig, SchedulerHandle, SchedulerState};
pub use service::{AutoSyncOutcome, SyncService};
