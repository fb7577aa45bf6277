//! Application object wiring the store and the GitHub services.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use easyhybrid_core::store::default_data_dir;
use easyhybrid_core::{LocalStore, parse_date, secret};
use easyhybrid_sync::{
    AutoSyncOutcome, GistApi, GitHubClient, HttpTokenRelay, OAuthConfig, OAuthService,
    SyncService, oauth::GITHUB_AUTHORIZE_URL,
};

use crate::cli::Command;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Everything a command needs: configuration, local data and sync.
pub struct App {
    config: ClientConfig,
    store: LocalStore,
    api: Arc<dyn GistApi>,
    sync: SyncService,
    today: NaiveDate,
}

impl App {
    /// Builds the application from the configuration, talking to GitHub.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let store = match config.data_dir {
            Some(ref dir) => LocalStore::new(dir),
            None => LocalStore::new(default_data_dir()?),
        };
        let api: Arc<dyn GistApi> = Arc::new(GitHubClient::new()?);
        Ok(Self::with_parts(config, store, api))
    }

    /// Builds the application from explicit parts.
    pub fn with_parts(config: ClientConfig, store: LocalStore, api: Arc<dyn GistApi>) -> Self {
        let sync =
            SyncService::new(store.clone(), api.clone()).with_cooldown(config.sync.cooldown());
        debug!(dir = %store.dir().display(), "opened local store");
        Self {
            config,
            store,
            api,
            sync,
            today: Local::now().date_naive(),
        }
    }

    /// Pins "today", for tests and reproducible output.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn sync(&mut self) -> &mut SyncService {
        &mut self.sync
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Parses a `YYYY-MM-DD` argument, defaulting to today.
    pub fn date_or_today(&self, date: Option<&str>) -> ClientResult<NaiveDate> {
        match date {
            Some(s) => Ok(parse_date(s)?),
            None => Ok(self.today),
        }
    }

    /// Builds the OAuth service from the `[github]` settings.
    pub fn oauth(&self) -> ClientResult<OAuthService> {
        let github = &self.config.github;
        let client_id = secret::resolve(&github.client_id).map_err(|e| {
            ClientError::Config(format!("failed to resolve github.client_id: {}", e))
        })?;
        let oauth_config = OAuthConfig {
            client_id,
            scope: github.scope.clone(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
        };
        let relay = Arc::new(HttpTokenRelay::new(github.relay_url.clone()));
        Ok(OAuthService::new(
            self.store.clone(),
            oauth_config,
            relay,
            self.api.clone(),
        ))
    }

    /// Runs the throttled auto-sync. Never fails; problems are logged.
    pub async fn auto_sync(&mut self) -> AutoSyncOutcome {
        let outcome = self.sync.auto_sync_if_needed().await;
        debug!(?outcome, "startup auto-sync");
        outcome
    }

    /// Startup step run before dispatching `command`.
    pub async fn before_command(&mut self, command: &Command) -> AutoSyncOutcome {
        if !command.auto_syncs_first() {
            return AutoSyncOutcome::Skipped;
        }
        self.auto_sync().await
    }

    /// Backs up right away after a local change when sync is enabled.
    ///
    /// A failure is reported as a warning; the local change stands.
    pub async fn data_changed(&mut self) {
        if !self.sync.is_enabled() {
            return;
        }
        if let Err(e) = self.sync.sync_now().await {
            warn!(error = %e, "backup after local change failed");
            eprintln!("warning: changes saved locally but backup failed: {}", e);
        }
    }

    /// Hands the sync service over, for long-running commands.
    pub fn into_sync(self) -> SyncService {
        self.sync
    }
}
