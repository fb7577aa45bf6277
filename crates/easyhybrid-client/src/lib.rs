//! Command-line interface for easyhybrid.
//!
//! This crate provides the `easyhybrid` binary: local attendance commands,
//! statistics, export/import and GitHub Gist sync.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use app::App;
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
