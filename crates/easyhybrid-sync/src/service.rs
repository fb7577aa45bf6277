//! Backup and restore of user data to a private GitHub gist.
//!
//! The service moves through three states: disabled (no config), enabled
//! without a bound gist, and enabled with a bound gist. Every backup replaces
//! the whole remote document; the last writer wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use easyhybrid_core::LocalStore;
use easyhybrid_core::UserData;
use easyhybrid_core::store::{SYNC_CONFIG_FILE, Visibility};
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_COOLDOWN, SyncConfig, SyncStatus};
use crate::document::{GIST_DESCRIPTION, GIST_FILENAME, GistDocument};
use crate::error::{SyncError, SyncResult};
use crate::gist::{GistApi, GitHubUser};

/// What a throttled auto-sync attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSyncOutcome {
    /// Sync is disabled or auto-sync is off.
    Skipped,
    /// The last sync is more recent than the cooldown.
    CoolingDown,
    /// A backup was made.
    Synced,
    /// A backup was attempted and failed; the error was logged.
    Failed,
}

/// Owns the sync configuration and talks to GitHub through a [`GistApi`].
pub struct SyncService {
    store: LocalStore,
    api: Arc<dyn GistApi>,
    cooldown: Duration,
    config: Option<SyncConfig>,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("store", &self.store)
            .field("cooldown", &self.cooldown)
            .field("status", &self.status())
            .finish()
    }
}

impl SyncService {
    /// Creates the service and loads any saved configuration.
    ///
    /// An unreadable configuration is logged and treated as absent.
    pub fn new(store: LocalStore, api: Arc<dyn GistApi>) -> Self {
        let config = match store.load_json::<SyncConfig>(SYNC_CONFIG_FILE) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable sync configuration");
                None
            }
        };

        Self {
            store,
            api,
            cooldown: DEFAULT_COOLDOWN,
            config,
        }
    }

    /// Sets the auto-sync cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn config(&self) -> Option<&SyncConfig> {
        self.config.as_ref()
    }

    /// Validates `token`, enables sync and binds the backup gist, reusing an
    /// existing one when found and creating a seeded one otherwise.
    pub async fn setup(&mut self, token: &str, auto_sync: bool) -> SyncResult<GitHubUser> {
        let user = self.api.current_user(token).await?;
        info!(login = %user.login, "GitHub token accepted");

        let mut config = SyncConfig::new(token, auto_sync, Utc::now());

        let gists = self.api.list_gists(token).await?;
        if let Some(existing) = gists
            .iter()
            .find(|g| g.matches(GIST_DESCRIPTION, GIST_FILENAME))
        {
            info!(gist_id = %existing.id, "found existing backup gist");
            config.gist_id = Some(existing.id.clone());
        } else {
            let content = GistDocument::empty(Utc::now()).to_json()?;
            let id = self
                .api
                .create_gist(token, GIST_DESCRIPTION, GIST_FILENAME, &content)
                .await?;
            info!(gist_id = %id, "created backup gist");
            config.gist_id = Some(id);
        }

        self.save_config(config)?;
        Ok(user)
    }

    /// Uploads the local data, creating the gist if none is bound.
    pub async fn backup(&mut self) -> SyncResult<()> {
        let config = self.enabled_config()?.clone();

        let data = self.store.load_user_data()?;
        let content = GistDocument::from_user_data(&data, Utc::now()).to_json()?;

        let gist_id = match config.gist_id.as_deref() {
            Some(id) => {
                self.api
                    .update_gist(&config.token, id, GIST_FILENAME, &content)
                    .await?;
                id.to_string()
            }
            None => {
                self.api
                    .create_gist(&config.token, GIST_DESCRIPTION, GIST_FILENAME, &content)
                    .await?
            }
        };

        info!(
            gist_id = %gist_id,
            records = data.attendance.len(),
            "backed up attendance data"
        );
        self.save_config(SyncConfig {
            gist_id: Some(gist_id),
            last_sync_time: Some(Utc::now()),
            ..config
        })
    }

    /// Replaces local attendance, holidays and target with the gist content.
    pub async fn restore(&mut self) -> SyncResult<UserData> {
        let config = self.enabled_config()?.clone();
        let Some(gist_id) = config.gist_id.as_deref() else {
            return Err(SyncError::not_configured("No gist configured"));
        };

        let gist = self.api.get_gist(&config.token, gist_id).await?;
        let content = gist
            .file_content(GIST_FILENAME)
            .ok_or_else(|| SyncError::parse("Attendance data not found in gist"))?;
        let data = GistDocument::from_json(content)?.into_user_data();

        self.store.save_user_data(&data)?;
        info!(
            gist_id = %gist_id,
            records = data.attendance.len(),
            "restored attendance data"
        );

        self.save_config(SyncConfig {
            last_sync_time: Some(Utc::now()),
            ..config
        })?;
        Ok(data)
    }

    /// Immediate backup for user-initiated changes, ignoring the cooldown.
    pub async fn sync_now(&mut self) -> SyncResult<()> {
        self.backup().await
    }

    /// Backs up if auto-sync is on and the cooldown has elapsed. Failures are
    /// logged, never returned.
    pub async fn auto_sync_if_needed(&mut self) -> AutoSyncOutcome {
        let Some(config) = self.config.as_ref().filter(|c| c.enabled && c.auto_sync) else {
            return AutoSyncOutcome::Skipped;
        };

        if config.in_cooldown(self.cooldown, Utc::now()) {
            debug!("auto-sync skipped, last sync is within the cooldown");
            return AutoSyncOutcome::CoolingDown;
        }

        match self.backup().await {
            Ok(()) => {
                debug!("auto-sync completed");
                AutoSyncOutcome::Synced
            }
            Err(e) => {
                warn!(error = %e, "auto-sync failed");
                AutoSyncOutcome::Failed
            }
        }
    }

    /// Forgets the configuration. Local attendance data is left alone.
    pub fn disable(&mut self) -> SyncResult<()> {
        self.config = None;
        self.store.remove(SYNC_CONFIG_FILE)?;
        info!("GitHub sync disabled");
        Ok(())
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus::from(self.config.as_ref())
    }

    /// Returns true if sync is enabled with a token.
    pub fn is_enabled(&self) -> bool {
        self.config
            .as_ref()
            .is_some_and(|c| c.enabled && !c.token.is_empty())
    }

    fn enabled_config(&self) -> SyncResult<&SyncConfig> {
        self.config
            .as_ref()
            .filter(|c| c.enabled)
            .ok_or_else(|| SyncError::not_configured("Gist integration not enabled"))
    }

    fn save_config(&mut self, config: SyncConfig) -> SyncResult<()> {
        self.store
            .save_json(SYNC_CONFIG_FILE, &config, Visibility::Private)?;
        self.config = Some(config);
        Ok(())
    }
}
