//! Graceful shutdown handling.

use std::future::Future;
use std::io;

use tokio_util::sync::CancellationToken;

use crate::refresh::SchedulerHandle;

/// Resolves on Ctrl-C or when `cancel` is cancelled, whichever comes first.
///
/// Cancels `cancel` on the way out so background tasks sharing the token stop
/// with the server.
pub async fn shutdown_signal(cancel: CancellationToken) {
    wait_for_shutdown(tokio::signal::ctrl_c(), cancel).await
}

async fn wait_for_shutdown<F>(ctrl_c: F, cancel: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        result = ctrl_c => {
            match result {
                Ok(()) => log::info!("Received Ctrl-C, shutting down"),
                Err(e) => {
                    // Without a signal handler only an explicit cancel stops the server
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    cancel.cancelled().await;
                }
            }
        }
        _ = cancel.cancelled() => {}
    }
    cancel.cancel();
}

/// Stops the refresh scheduler if one was started.
pub async fn shutdown_gracefully(cancel: CancellationToken, scheduler: Option<SchedulerHandle>) {
    cancel.cancel();
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_signal_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let waiter = tokio::spawn(shutdown_signal(cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown signal did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_signal_handler_waits_for_cancel() {
        let cancel = CancellationToken::new();
        let failing = async { Err(io::Error::other("no signal support")) };
        let waiter = tokio::spawn(wait_for_shutdown(failing, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!waiter.is_finished());
        assert!(!cancel.is_cancelled());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown did not follow cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_gracefully_without_scheduler() {
        let cancel = CancellationToken::new();
        shutdown_gracefully(cancel.clone(), None).await;
        assert!(cancel.is_cancelled());
    }
}
