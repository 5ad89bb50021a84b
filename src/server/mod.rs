//! HTTP adapter.
//!
//! Every path is treated as an address: `GET /8.8.8.8` describes that address
//! and `GET /` describes the caller.

mod handlers;
mod types;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;

pub use handlers::{client_address, lookup_handler, respond};
pub use types::{AppState, ErrorDetail, ErrorResponse};

use crate::lookup::LookupService;

/// Builds the router.
pub fn router(lookups: LookupService) -> Router {
    Router::new()
        .fallback(lookup_handler)
        .with_state(AppState { lookups })
}

/// Binds `listen` and serves until `shutdown` resolves.
pub async fn serve<F>(listen: &str, lookups: LookupService, shutdown: F) -> Result<(), anyhow::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to {}: {}", listen, e))?;

    log::info!("Server listening on http://{}/", listen);

    axum::serve(
        listener,
        router(lookups).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
