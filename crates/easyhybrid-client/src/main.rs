//! easyhybrid CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use easyhybrid_client::cli::{
    self, AuthProvider, Cli, Command, ConfigAction, HolidayAction, SyncAction,
};
use easyhybrid_client::commands;
use easyhybrid_client::config::ClientConfig;
use easyhybrid_client::error::{ClientError, ClientResult};
use easyhybrid_client::App;
use easyhybrid_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::cli(cli.debug)) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    // Configuration commands never touch data
    if let Command::Config { action } = cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
        };
    }

    let mut app = App::new(config)?;
    app.before_command(&cli.command).await;

    match cli.command {
        Command::Mark {
            date,
            remote,
            absent,
            note,
        } => {
            commands::attendance::mark(
                &mut app,
                date.as_deref(),
                cli::attendance_type(remote, absent),
                note,
            )
            .await
        }
        Command::Toggle { date } => commands::attendance::toggle(&mut app, &date).await,
        Command::Unmark { date } => commands::attendance::unmark(&mut app, &date).await,
        Command::Today { absent } => commands::attendance::today(&mut app, absent).await,
        Command::Holiday { action } => match action {
            HolidayAction::Add { date, name } => {
                commands::holidays::add(&mut app, &date, name).await
            }
            HolidayAction::Remove { date } => commands::holidays::remove(&mut app, &date).await,
            HolidayAction::Toggle { date } => commands::holidays::toggle(&mut app, &date).await,
            HolidayAction::List { year } => commands::holidays::list(&app, year),
        },
        Command::Target { rate } => commands::target::target(&mut app, rate.as_deref()).await,
        Command::Stats { period, date, json } => {
            commands::stats::stats(&app, period, date.as_deref(), json)
        }
        Command::Calendar { month } => commands::calendar::calendar(&app, month.as_deref()),
        Command::Export { output } => commands::transfer::export(&app, output).map(|_| ()),
        Command::Import { path } => commands::transfer::import(&mut app, &path).await,
        Command::Auth { provider } => match provider {
            AuthProvider::Github {
                manual_sync,
                no_browser,
            } => commands::auth::github(&mut app, manual_sync, no_browser).await,
        },
        Command::Sync { action } => match action {
            SyncAction::Setup { token, manual_sync } => {
                commands::sync::setup(&mut app, &token, manual_sync).await
            }
            SyncAction::Backup => commands::sync::backup(&mut app).await,
            SyncAction::Restore => commands::sync::restore(&mut app).await,
            SyncAction::Now => commands::sync::now(&mut app).await,
            SyncAction::Status => commands::sync::status(&mut app),
            SyncAction::Disable => commands::sync::disable(&mut app),
            SyncAction::Watch => commands::sync::watch(app).await,
        },
        Command::Config { .. } => Ok(()),
    }
}
