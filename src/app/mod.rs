//! Service wiring: store, refresh scheduler, resolver and HTTP server.

pub mod shutdown;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::geoip::{DatasetOpener, DatasetSource, MmdbOpener, ReferenceStore};
use crate::initialization::{init_client, init_resolver};
use crate::lookup::LookupService;
use crate::refresh::{RefreshScheduler, RefreshSettings};
use crate::server;

pub use shutdown::{shutdown_gracefully, shutdown_signal};

/// Runs the service until Ctrl-C.
///
/// Startup order: start the refresh workers (their first check fires
/// immediately), wait the settle delay, load whatever databases are on disk,
/// then serve. A missing or broken database is a warning; the service still
/// answers with whatever it has, bogon classification at minimum.
pub async fn run_server(config: Config) -> Result<()> {
    let store = Arc::new(ReferenceStore::new());
    let opener: Arc<dyn DatasetOpener> = Arc::new(MmdbOpener);
    let client = init_client().context("Failed to initialize HTTP client")?;

    let scheduler = Arc::new(RefreshScheduler::new(
        Arc::clone(&store),
        opener,
        client,
        DatasetSource::defaults(),
        config.data_dir.clone(),
        RefreshSettings::from_config(&config),
    ));

    let cancel = CancellationToken::new();
    let refresh = if config.no_refresh {
        log::info!("Database refresh disabled");
        None
    } else {
        let handle = Arc::clone(&scheduler).start(cancel.clone());
        tokio::time::sleep(config.settle_delay()).await;
        Some(handle)
    };

    warm_load(&scheduler).await;

    let (inner, outer) = config.dns_deadlines();
    let lookups = LookupService::new(store, init_resolver(inner, outer));

    let result = server::serve(&config.listen, lookups, shutdown_signal(cancel.clone())).await;
    shutdown_gracefully(cancel, refresh).await;
    result
}

async fn warm_load(scheduler: &RefreshScheduler) {
    match scheduler.reload().await {
        Ok(report) => {
            for (kind, e) in &report.failed {
                log::warn!("Failed to load {} database: {}", kind, e);
            }
            if report.loaded.is_empty() {
                log::warn!("No databases loaded; only bogon classification is available");
            } else {
                log::info!("Databases loaded: {:?}", report.loaded);
            }
            if !report.missing.is_empty() {
                log::warn!("Databases not on disk yet: {:?}", report.missing);
            }
        }
        Err(e) => log::warn!("Failed to load databases: {}", e),
    }
}
