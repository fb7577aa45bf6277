//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/easyhybrid/config.toml` by default. Every section is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use easyhybrid_core::Period;
use easyhybrid_sync::oauth::{DEFAULT_CLIENT_ID, DEFAULT_SCOPE};
use easyhybrid_sync::scheduler::DEFAULT_POLL_INTERVAL;
use easyhybrid_sync::config::DEFAULT_COOLDOWN;

/// Relay endpoint used when none is configured.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8788/api/oauth/callback";

/// Loopback ports tried for the OAuth redirect.
pub const DEFAULT_REDIRECT_PORTS: (u16, u16) = (8765, 8775);

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the easyhybrid client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Where attendance data is kept. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// GitHub sign-in settings.
    pub github: GitHubSettings,

    /// Sync timing.
    pub sync: SyncSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// GitHub OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Public OAuth app client id (supports `pass::` and `env::` prefixes).
    pub client_id: String,

    /// Token relay endpoint.
    pub relay_url: String,

    /// Requested scope.
    pub scope: String,

    /// Inclusive range of loopback ports for the redirect.
    pub redirect_port_range: (u16, u16),
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            redirect_port_range: DEFAULT_REDIRECT_PORTS,
        }
    }
}

/// Sync timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Minimum minutes between two automatic backups.
    pub cooldown_minutes: u64,

    /// Minutes between two checks in `sync watch`.
    pub poll_minutes: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cooldown_minutes: DEFAULT_COOLDOWN.as_secs() / 60,
            poll_minutes: DEFAULT_POLL_INTERVAL.as_secs() / 60,
        }
    }
}

impl SyncSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_minutes * 60)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_minutes * 60)
    }
}

/// Display settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Period shown by `stats` when `--period` is not given.
    pub default_period: Period,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("easyhybrid")
    }

    /// Checks the values serde cannot check.
    pub fn validate(&self) -> Result<(), String> {
        let (low, high) = self.github.redirect_port_range;
        if low == 0 || low > high {
            return Err(format!(
                "github.redirect_port_range [{}, {}] must be a non-empty range of non-zero ports",
                low, high
            ));
        }
        if self.github.client_id.trim().is_empty() {
            return Err("github.client_id must not be empty".to_string());
        }
        if !(self.github.relay_url.starts_with("http://")
            || self.github.relay_url.starts_with("https://"))
        {
            return Err(format!(
                "github.relay_url '{}' must be an http(s) URL",
                self.github.relay_url
            ));
        }
        if self.sync.cooldown_minutes == 0 {
            return Err("sync.cooldown_minutes must be at least 1".to_string());
        }
        if self.sync.poll_minutes == 0 {
            return Err("sync.poll_minutes must be at least 1".to_string());
        }
        Ok(())
    }
}
