//! Periodic auto-sync.
//!
//! Every tick runs the throttled [`SyncService::auto_sync_if_needed`]; the
//! service's cooldown decides whether anything is uploaded, the tick only
//! wakes it up. A [`SchedulerHandle`] can force an immediate sync or stop
//! the loop. Dropping every handle also stops it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::service::{AutoSyncOutcome, SyncService};

/// Default interval between two throttled checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between two auto-sync checks.
    pub poll_interval: Duration,
    /// Whether to check once right after starting.
    pub check_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            check_on_start: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Default::default()
        }
    }
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Back up now, ignoring the cooldown.
    SyncNow,
    Stop,
}

/// What the scheduler has done so far.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Number of wakeups, timer or command.
    pub ticks: u64,
    /// Number of backups that reached GitHub.
    pub syncs: u64,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SchedulerState {
    fn record(&mut self, outcome: Result<bool, String>) {
        self.ticks += 1;
        match outcome {
            Ok(false) => {}
            Ok(true) => {
                self.syncs += 1;
                self.last_attempt = Some(Utc::now());
                self.last_error = None;
            }
            Err(e) => {
                self.last_attempt = Some(Utc::now());
                self.last_error = Some(e);
            }
        }
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Runs auto-sync on a timer against a shared [`SyncService`].
pub struct AutoSyncScheduler {
    config: SchedulerConfig,
    service: Arc<Mutex<SyncService>>,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl AutoSyncScheduler {
    pub fn new(config: SchedulerConfig, service: Arc<Mutex<SyncService>>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            service,
            state: Arc::new(RwLock::new(SchedulerState::default())),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Spawns the loop on the current runtime and returns its handle.
    pub fn spawn(self) -> (SchedulerHandle, tokio::task::JoinHandle<()>) {
        let handle = self.handle();
        let task = tokio::spawn(self.run());
        (handle, task)
    }

    /// Runs until stopped or until every handle is dropped.
    pub async fn run(self) {
        let Self {
            config,
            service,
            state,
            command_tx,
            mut command_rx,
        } = self;
        drop(command_tx);

        info!(
            interval_secs = config.poll_interval.as_secs(),
            "auto-sync scheduler started"
        );

        if config.check_on_start {
            Self::check(&service, &state).await;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(config.poll_interval) => {
                    Self::check(&service, &state).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("received SyncNow command");
                            Self::sync_now(&service, &state).await;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("auto-sync scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn check(service: &Mutex<SyncService>, state: &RwLock<SchedulerState>) {
        let outcome = service.lock().await.auto_sync_if_needed().await;
        debug!(?outcome, "auto-sync check");
        let recorded = match outcome {
            AutoSyncOutcome::Synced => Ok(true),
            AutoSyncOutcome::Failed => Err("auto-sync failed".to_string()),
            AutoSyncOutcome::Skipped | AutoSyncOutcome::CoolingDown => Ok(false),
        };
        state.write().await.record(recorded);
    }

    async fn sync_now(service: &Mutex<SyncService>, state: &RwLock<SchedulerState>) {
        let result = service.lock().await.sync_now().await;
        if let Err(ref e) = result {
            warn!(error = %e, "sync failed");
        }
        state
            .write()
            .await
            .record(result.map(|()| true).map_err(|e| e.to_string()));
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Triggers an immediate sync.
    pub async fn sync_now(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::SyncNow).await
    }

    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }
}
