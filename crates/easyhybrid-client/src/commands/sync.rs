//! Sync commands.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use easyhybrid_core::secret;
use easyhybrid_core::store::GITHUB_USER_FILE;
use easyhybrid_sync::{AutoSyncScheduler, GitHubUser, SchedulerConfig, SyncError};

use crate::app::App;
use crate::error::{ClientError, ClientResult};

/// Enables sync with a token and binds the backup gist.
pub async fn setup(app: &mut App, token: &str, manual_sync: bool) -> ClientResult<()> {
    let token = secret::resolve(token)?;
    let user = app.sync().setup(&token, !manual_sync).await?;
    app.store()
        .save_json(GITHUB_USER_FILE, &user, easyhybrid_core::Visibility::Normal)?;

    println!("Sync enabled for {}.", user.display_name());
    if manual_sync {
        println!("Automatic backup is off; edits are still backed up right away.");
    }
    Ok(())
}

pub async fn backup(app: &mut App) -> ClientResult<()> {
    app.sync().backup().await?;
    println!("Backed up.");
    Ok(())
}

/// Overwrites local data with the backup.
pub async fn restore(app: &mut App) -> ClientResult<()> {
    let data = app.sync().restore().await?;
    println!(
        "Restored {} record(s), {} holiday(s), target {}.",
        data.attendance.len(),
        data.holidays.len(),
        data.target_rate
    );
    Ok(())
}

pub async fn now(app: &mut App) -> ClientResult<()> {
    app.sync().sync_now().await?;
    println!("Backed up.");
    Ok(())
}

pub fn status(app: &mut App) -> ClientResult<()> {
    let status = app.sync().status();
    if !status.enabled {
        println!("Sync: disabled");
        return Ok(());
    }

    let user: Option<GitHubUser> = app.store().load_json(GITHUB_USER_FILE)?;
    println!("Sync: enabled");
    if let Some(user) = user {
        println!("Account: {} ({})", user.display_name(), user.login);
    }
    println!(
        "Backup gist: {}",
        if status.has_document { "bound" } else { "none yet" }
    );
    println!(
        "Automatic backup: {}",
        if status.auto_sync { "on" } else { "off" }
    );
    match status.last_sync {
        Some(t) => println!(
            "Last sync: {}",
            t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        None => println!("Last sync: never"),
    }
    Ok(())
}

/// Turns sync off and forgets the token. Local data is kept.
pub fn disable(app: &mut App) -> ClientResult<()> {
    app.sync().disable()?;
    app.store().remove(GITHUB_USER_FILE)?;
    println!("Sync disabled. Local data is unchanged.");
    Ok(())
}

/// Runs the auto-sync scheduler until Ctrl-C.
pub async fn watch(app: App) -> ClientResult<()> {
    let poll_interval = app.config().sync.poll_interval();
    let sync = app.into_sync();
    if !sync.is_enabled() {
        return Err(SyncError::not_configured(
            "sync is not enabled, run `easyhybrid sync setup` first",
        )
        .into());
    }

    let service = Arc::new(Mutex::new(sync));
    let scheduler = AutoSyncScheduler::new(SchedulerConfig::new(poll_interval), service);
    let (handle, task) = scheduler.spawn();

    println!(
        "Watching; checking every {} minute(s). Press Ctrl-C to stop.",
        poll_interval.as_secs() / 60
    );
    tokio::signal::ctrl_c().await?;

    info!("stopping auto-sync scheduler");
    // The loop may already be gone if it panicked; joining reports that.
    let _ = handle.stop().await;
    task.await.map_err(|e| {
        ClientError::Sync(SyncError::internal(format!("scheduler task failed: {}", e)))
    })?;

    let state = handle.state().await;
    println!("Stopped after {} backup(s).", state.syncs);
    if let Some(err) = state.last_error {
        eprintln!("last error: {}", err);
    }
    Ok(())
}
