//! Command implementations, one module per command group.

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod holidays;
pub mod stats;
pub mod sync;
pub mod target;
pub mod transfer;
