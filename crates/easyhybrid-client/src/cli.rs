//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use easyhybrid_core::{AttendanceType, Period};

/// easyhybrid - Office attendance against your hybrid-work target
#[derive(Debug, Parser)]
#[command(name = "easyhybrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EASYHYBRID_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a day (default: today, in the office)
    Mark {
        /// Date as YYYY-MM-DD
        date: Option<String>,

        /// Worked remotely
        #[arg(long, conflicts_with = "absent")]
        remote: bool,

        /// Did not work
        #[arg(long)]
        absent: bool,

        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },

    /// Add an office day, or remove the record if the day is already reported
    Toggle {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Remove the record for a day
    Unmark {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Mark today as present (or absent)
    Today {
        /// Mark today as absent instead
        #[arg(long)]
        absent: bool,
    },

    /// Holiday commands
    Holiday {
        #[command(subcommand)]
        action: HolidayAction,
    },

    /// Show or set the target attendance rate
    Target {
        /// New rate, in percent (1-100)
        rate: Option<String>,
    },

    /// Show attendance statistics for a period
    Stats {
        /// monthly, quarterly or yearly (default from config)
        #[arg(long, short)]
        period: Option<Period>,

        /// Any date inside the period (default: today)
        #[arg(long, short)]
        date: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show a month calendar
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(long, short)]
        month: Option<String>,
    },

    /// Export attendance, personal holidays and target to a JSON file
    Export {
        /// Output file (default: attendance-data-<today>.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace local data with an exported JSON file
    Import {
        /// File to import
        path: PathBuf,
    },

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// GitHub Gist backup commands
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Returns true for commands preceded by the throttled startup backup.
    ///
    /// Sync and auth commands talk to the gist themselves; a backup ahead of
    /// `sync restore` would replace the remote data it is about to fetch.
    pub fn auto_syncs_first(&self) -> bool {
        !matches!(
            self,
            Command::Config { .. } | Command::Auth { .. } | Command::Sync { .. }
        )
    }
}

/// Holiday actions.
#[derive(Debug, Subcommand)]
pub enum HolidayAction {
    /// Add a personal holiday
    Add {
        /// Date as YYYY-MM-DD
        date: String,

        /// Holiday name
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove every holiday on a date, public ones included
    Remove {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Remove the holidays on a date, or add a personal one if there are none
    Toggle {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// List holidays
    List {
        /// Only this year
        #[arg(long)]
        year: Option<i32>,
    },
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Sign in with GitHub and enable Gist backup
    Github {
        /// Do not back up automatically, only on explicit sync commands and edits
        #[arg(long)]
        manual_sync: bool,

        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
}

/// Sync actions.
#[derive(Debug, Subcommand)]
pub enum SyncAction {
    /// Enable sync with a personal access token
    Setup {
        /// Token with the gist scope (supports pass:: and env:: prefixes)
        #[arg(long, env = "EASYHYBRID_GITHUB_TOKEN")]
        token: String,

        /// Do not back up automatically
        #[arg(long)]
        manual_sync: bool,
    },

    /// Upload local data to the backup gist
    Backup,

    /// Replace local data with the backup gist
    Restore,

    /// Back up now, ignoring the cooldown
    Now,

    /// Show sync status
    Status,

    /// Disable sync and forget the token
    Disable,

    /// Keep running and back up on a timer until Ctrl-C
    Watch,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Attendance type selected by `mark` flags.
pub fn attendance_type(remote: bool, absent: bool) -> AttendanceType {
    if absent {
        AttendanceType::Absent
    } else if remote {
        AttendanceType::Remote
    } else {
        AttendanceType::Office
    }
}
