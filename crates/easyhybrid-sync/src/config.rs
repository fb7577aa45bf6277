//! Persisted sync configuration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default minimum interval between two automatic backups.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Sync settings, created by setup and removed by disable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// GitHub access token with the `gist` scope.
    pub token: String,
    /// The bound backup gist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gist_id: Option<String>,
    pub enabled: bool,
    pub auto_sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl SyncConfig {
    pub fn new(token: impl Into<String>, auto_sync: bool, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            gist_id: None,
            enabled: true,
            auto_sync,
            last_sync_time: Some(now),
        }
    }

    /// Returns true if less than `cooldown` has passed since the last sync.
    ///
    /// A config that never synced is never cooling down. A last sync in the
    /// future (clock skew) counts as recent.
    pub fn in_cooldown(&self, cooldown: Duration, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_sync_time else {
            return false;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed < cooldown,
            Err(_) => true,
        }
    }
}

/// Snapshot reported by `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub enabled: bool,
    pub has_document: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub auto_sync: bool,
}

impl From<Option<&SyncConfig>> for SyncStatus {
    fn from(config: Option<&SyncConfig>) -> Self {
        match config {
            Some(c) => Self {
                enabled: c.enabled,
                has_document: c.gist_id.is_some(),
                last_sync: c.last_sync_time,
                auto_sync: c.auto_sync,
            },
            None => Self::default(),
        }
    }
}
