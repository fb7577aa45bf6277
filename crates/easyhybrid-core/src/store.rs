//! Local persisted state.
//!
//! The store is a directory of small files, one per key. Writes go to a
//! temporary file first and are then renamed over the target, so a crash
//! never leaves a half-written document behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::attendance::{AttendanceLog, HolidayCalendar, TargetRate};
use crate::error::{CoreError, CoreResult};

/// Attendance records.
pub const ATTENDANCE_FILE: &str = "attendance.json";
/// Public and personal holidays.
pub const HOLIDAYS_FILE: &str = "holidays.json";
/// Target rate as a plain number.
pub const TARGET_RATE_FILE: &str = "target_rate";
/// Sync configuration, including the access token.
pub const SYNC_CONFIG_FILE: &str = "sync_config.json";
/// Cached GitHub identity.
pub const GITHUB_USER_FILE: &str = "github_user.json";
/// Pending OAuth state token.
pub const OAUTH_STATE_FILE: &str = "oauth_state";

/// Whether a file may hold credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Default permissions.
    Normal,
    /// Owner read/write only on Unix.
    Private,
}

/// The three pieces of user data that travel together on backup and restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub attendance: AttendanceLog,
    pub holidays: HolidayCalendar,
    pub target_rate: TargetRate,
}

/// File-backed key/value store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store in the per-user data directory.
    pub fn open_default() -> CoreResult<Self> {
        Ok(Self::new(default_data_dir()?))
    }

    /// Returns the root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of a key.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Returns true if the key exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Reads a key as text, `None` if it does not exist.
    pub fn read_text(&self, name: &str) -> CoreResult<Option<String>> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    /// Writes a key atomically.
    pub fn write_text(&self, name: &str, content: &str, visibility: Visibility) -> CoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| CoreError::io(&self.dir, e))?;

        let path = self.path(name);
        let temp_path = self.dir.join(format!("{name}.tmp"));

        fs::write(&temp_path, content).map_err(|e| CoreError::io(&temp_path, e))?;

        #[cfg(unix)]
        if visibility == Visibility::Private {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&temp_path, perms);
        }
        #[cfg(not(unix))]
        let _ = visibility;

        fs::rename(&temp_path, &path).map_err(|e| CoreError::io(&path, e))?;

        debug!(path = %path.display(), "wrote store entry");
        Ok(())
    }

    /// Deletes a key. Missing keys are not an error.
    pub fn remove(&self, name: &str) -> CoreResult<()> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed store entry");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    /// Reads and decodes a JSON key, `None` if it does not exist.
    pub fn load_json<T: DeserializeOwned>(&self, name: &str) -> CoreResult<Option<T>> {
        match self.read_text(name)? {
            Some(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| CoreError::json(name, e)),
            None => Ok(None),
        }
    }

    /// Encodes a value as pretty JSON and writes it.
    pub fn save_json<T: Serialize>(
        &self,
        name: &str,
        value: &T,
        visibility: Visibility,
    ) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(value).map_err(|e| CoreError::json(name, e))?;
        self.write_text(name, &content, visibility)
    }

    /// Loads attendance, empty when nothing was recorded yet.
    pub fn load_attendance(&self) -> CoreResult<AttendanceLog> {
        Ok(self.load_json(ATTENDANCE_FILE)?.unwrap_or_default())
    }

    pub fn save_attendance(&self, attendance: &AttendanceLog) -> CoreResult<()> {
        self.save_json(ATTENDANCE_FILE, attendance, Visibility::Normal)
    }

    /// Loads holidays, seeded with the public holiday table on first use.
    pub fn load_holidays(&self) -> CoreResult<HolidayCalendar> {
        Ok(self
            .load_json(HOLIDAYS_FILE)?
            .unwrap_or_else(HolidayCalendar::with_public_holidays))
    }

    pub fn save_holidays(&self, holidays: &HolidayCalendar) -> CoreResult<()> {
        self.save_json(HOLIDAYS_FILE, holidays, Visibility::Normal)
    }

    /// Loads the target rate.
    ///
    /// The file holds a bare number. Fractional values are rounded and out of
    /// range values clamped; an unreadable value falls back to the default.
    pub fn load_target_rate(&self) -> CoreResult<TargetRate> {
        let Some(content) = self.read_text(TARGET_RATE_FILE)? else {
            return Ok(TargetRate::default());
        };
        match content.trim().parse::<f64>() {
            Ok(value) => Ok(TargetRate::from_lenient(value)),
            Err(_) => {
                warn!(value = %content.trim(), "ignoring unreadable target rate");
                Ok(TargetRate::default())
            }
        }
    }

    pub fn save_target_rate(&self, rate: TargetRate) -> CoreResult<()> {
        self.write_text(
            TARGET_RATE_FILE,
            &rate.percent().to_string(),
            Visibility::Normal,
        )
    }

    /// Loads attendance, holidays and target in one go.
    pub fn load_user_data(&self) -> CoreResult<UserData> {
        Ok(UserData {
            attendance: self.load_attendance()?,
            holidays: self.load_holidays()?,
            target_rate: self.load_target_rate()?,
        })
    }

    /// Overwrites attendance, holidays and target.
    pub fn save_user_data(&self, data: &UserData) -> CoreResult<()> {
        self.save_attendance(&data.attendance)?;
        self.save_holidays(&data.holidays)?;
        self.save_target_rate(data.target_rate)
    }
}

/// Returns `<platform data dir>/easyhybrid`.
pub fn default_data_dir() -> CoreResult<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("easyhybrid"))
        .ok_or_else(|| CoreError::Store("could not determine the user data directory".into()))
}
