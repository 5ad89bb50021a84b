//! Background refresh of the dataset files.
//!
//! Each dataset gets its own long-lived worker task, so one dataset's slow
//! probe or download never delays another's. A timer task sends ticks to the
//! workers over bounded channels; a worker that is still busy when a tick
//! arrives simply misses it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DOWNLOAD_TIMEOUT, PROBE_TIMEOUT};
use crate::error_handling::{RefreshError, StoreError};
use crate::geoip::{DatasetKind, DatasetOpener, DatasetSource, ReferenceStore, ReloadReport};
use crate::refresh::download::download_to;
use crate::refresh::probe::needs_update;

/// Timeouts and intervals for the refresh pipeline.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Time between periodic cycles
    pub interval: Duration,
    /// Timeout for the HEAD probe
    pub probe_timeout: Duration,
    /// Timeout for the full download
    pub download_timeout: Duration,
    /// Age threshold when the remote has no `Last-Modified`
    pub stale_after: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.refresh_interval(),
            probe_timeout: PROBE_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
            stale_after: config.stale_after(),
        }
    }
}

/// Result of one dataset's refresh attempt.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The local file is current (or the probe failed closed)
    UpToDate,
    /// A new file was installed and the store reloaded
    Updated,
    /// The attempt was aborted; the previous file and handle are kept
    Failed(RefreshError),
    /// Shutdown arrived before the install step; nothing was changed
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
enum RefreshCommand {
    Tick,
}

type TickSenders = Arc<Vec<(DatasetKind, mpsc::Sender<RefreshCommand>)>>;

/// Keeps the dataset files current and the reference store in sync with them.
pub struct RefreshScheduler {
    store: Arc<ReferenceStore>,
    opener: Arc<dyn DatasetOpener>,
    client: reqwest::Client,
    sources: Vec<DatasetSource>,
    data_dir: PathBuf,
    settings: RefreshSettings,
    /// Serializes release, rename and reload across datasets
    install_lock: Mutex<()>,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<ReferenceStore>,
        opener: Arc<dyn DatasetOpener>,
        client: reqwest::Client,
        sources: Vec<DatasetSource>,
        data_dir: PathBuf,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            store,
            opener,
            client,
            sources,
            data_dir,
            settings,
            install_lock: Mutex::new(()),
        }
    }

    pub fn sources(&self) -> &[DatasetSource] {
        &self.sources
    }

    /// Checks every dataset concurrently and installs whatever is newer.
    pub async fn run_cycle(&self) -> Vec<(DatasetKind, RefreshOutcome)> {
        join_all(
            self.sources
                .iter()
                .map(|source| async move { (source.kind, self.refresh_dataset(source).await) }),
        )
        .await
    }

    /// Probes one dataset and, if the remote copy is newer, downloads and
    /// installs it.
    pub async fn refresh_dataset(&self, source: &DatasetSource) -> RefreshOutcome {
        self.refresh_until(source, &CancellationToken::new()).await
    }

    /// Like `refresh_dataset`, but gives up if `cancel` fires during the
    /// probe or the download. Once the install step has started it always
    /// runs to completion, so a released handle is never left unreplaced.
    async fn refresh_until(
        &self,
        source: &DatasetSource,
        cancel: &CancellationToken,
    ) -> RefreshOutcome {
        let path = source.path_in(&self.data_dir);
        let staging = source.staging_path_in(&self.data_dir);

        let stale = tokio::select! {
            _ = cancel.cancelled() => return RefreshOutcome::Cancelled,
            stale = needs_update(
                &self.client,
                &path,
                &source.url,
                self.settings.probe_timeout,
                self.settings.stale_after,
            ) => stale,
        };
        if !stale {
            log::debug!("{} is up to date", source.file_name);
            return RefreshOutcome::UpToDate;
        }

        log::info!("Updating {}...", source.file_name);

        // The live file and the store are untouched until the download is complete
        let downloaded = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = tokio::fs::remove_file(&staging).await;
                return RefreshOutcome::Cancelled;
            }
            result = download_to(
                &self.client,
                &source.url,
                &staging,
                self.settings.download_timeout,
            ) => result,
        };

        let result = match downloaded {
            Ok(_) => self.install(source).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                log::info!("Successfully updated {}", source.file_name);
                RefreshOutcome::Updated
            }
            Err(e) => {
                log::warn!("Failed to update {}: {}", source.file_name, e);
                RefreshOutcome::Failed(e)
            }
        }
    }

    async fn install(&self, source: &DatasetSource) -> Result<(), RefreshError> {
        let path = source.path_in(&self.data_dir);
        let staging = source.staging_path_in(&self.data_dir);

        let _install = self.install_lock.lock().await;

        // Only the handle for the file being replaced is released
        if let Err(e) = self.store.release(source.kind) {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            match self.reload_locked().await {
                Ok(report) => log_reload(&report),
                Err(reload_err) => log::error!(
                    "Failed to restore databases after failed rename: {}",
                    reload_err
                ),
            }
            return Err(RefreshError::Rename { path, source: e });
        }

        let report = self.reload_locked().await?;
        log_reload(&report);
        Ok(())
    }

    /// Reopens every configured dataset file and swaps in whatever opened.
    ///
    /// Waits for any install in progress, so the handles swapped in always
    /// come from the files currently on disk.
    pub async fn reload(&self) -> Result<ReloadReport, StoreError> {
        let _install = self.install_lock.lock().await;
        self.reload_locked().await
    }

    /// Reload for callers already holding `install_lock`. Files are read on
    /// the blocking pool; a City database is tens of megabytes.
    async fn reload_locked(&self) -> Result<ReloadReport, StoreError> {
        let store = Arc::clone(&self.store);
        let opener = Arc::clone(&self.opener);
        let sources = self.sources.clone();
        let data_dir = self.data_dir.clone();

        tokio::task::spawn_blocking(move || store.reload(opener.as_ref(), &sources, &data_dir))
            .await
            .map_err(|e| StoreError::ReloadTask(e.to_string()))?
    }

    /// Starts one worker per dataset and the periodic timer.
    ///
    /// The first tick fires immediately, so every dataset is checked once at
    /// startup. Everything stops when `cancel` is cancelled or the returned
    /// handle is shut down.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> SchedulerHandle {
        let mut senders = Vec::with_capacity(self.sources.len());
        let mut tasks = Vec::with_capacity(self.sources.len() + 1);

        for source in self.sources.iter().cloned() {
            // Capacity 1: at most one cycle queued behind the running one
            let (tx, rx) = mpsc::channel(1);
            senders.push((source.kind, tx));
            tasks.push(tokio::spawn(run_worker(
                Arc::clone(&self),
                source,
                rx,
                cancel.clone(),
            )));
        }

        let senders: TickSenders = Arc::new(senders);
        tasks.push(tokio::spawn(run_timer(
            self.settings.interval,
            Arc::clone(&senders),
            cancel.clone(),
        )));

        SchedulerHandle {
            senders,
            cancel,
            tasks,
        }
    }
}

/// Control handle for a started scheduler.
pub struct SchedulerHandle {
    senders: TickSenders,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Requests an immediate refresh of every dataset.
    pub fn trigger(&self) {
        dispatch_tick(&self.senders);
    }

    /// Stops the timer and all workers and waits for them to exit.
    ///
    /// A probe or download in flight is abandoned and its staging file
    /// removed; an install already under way finishes first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

async fn run_worker(
    scheduler: Arc<RefreshScheduler>,
    source: DatasetSource,
    mut ticks: mpsc::Receiver<RefreshCommand>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = ticks.recv() => command,
        };

        match command {
            Some(RefreshCommand::Tick) => {
                if let RefreshOutcome::Cancelled = scheduler.refresh_until(&source, &cancel).await {
                    break;
                }
            }
            None => break,
        }
    }
    log::debug!("Refresh worker for {} stopped", source.file_name);
}

async fn run_timer(period: Duration, senders: TickSenders, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                log::info!("Checking for database updates...");
                dispatch_tick(&senders);
            }
        }
    }
}

fn dispatch_tick(senders: &TickSenders) {
    for (kind, tx) in senders.iter() {
        match tx.try_send(RefreshCommand::Tick) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::debug!("{} refresh still pending, tick coalesced", kind);
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("{} refresh worker stopped, tick dropped", kind);
            }
        }
    }
}

fn log_reload(report: &ReloadReport) {
    for (kind, e) in &report.failed {
        log::warn!("Failed to reload {} database: {}", kind, e);
    }
    log::debug!(
        "Databases loaded: {:?}, missing: {:?}",
        report.loaded,
        report.missing
    );
}
