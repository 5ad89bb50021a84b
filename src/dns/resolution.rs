//! Reverse DNS lookup with a hard latency ceiling.
//!
//! The lookup runs in its own task under an inner deadline. The caller waits
//! on that task under a slightly longer outer deadline, so a resolver that does
//! not honor cancellation promptly still cannot hold a request. A lookup that
//! outlives the outer deadline is abandoned; its late result is discarded.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::TokioAsyncResolver;

use crate::config::{DEFAULT_DNS_INNER_TIMEOUT_MS, DEFAULT_DNS_OUTER_TIMEOUT_MS};

/// Something that can resolve an address to its PTR names.
///
/// The returned future must be `'static` so it can outlive the request that
/// started it.
pub trait ReverseLookup: Send + Sync {
    fn lookup_ptr(&self, ip: IpAddr) -> BoxFuture<'static, Result<Vec<String>, Error>>;
}

impl ReverseLookup for TokioAsyncResolver {
    fn lookup_ptr(&self, ip: IpAddr) -> BoxFuture<'static, Result<Vec<String>, Error>> {
        let resolver = self.clone();
        async move {
            let response = resolver.reverse_lookup(ip).await.map_err(Error::new)?;
            Ok(response.iter().map(|name| name.to_utf8()).collect())
        }
        .boxed()
    }
}

/// Best-effort reverse DNS with an inner and an outer deadline.
#[derive(Clone)]
pub struct BoundedResolver {
    lookup: Arc<dyn ReverseLookup>,
    inner_timeout: Duration,
    outer_timeout: Duration,
}

impl BoundedResolver {
    /// Creates a resolver with the default 40ms/50ms deadlines.
    pub fn new(lookup: Arc<dyn ReverseLookup>) -> Self {
        Self::with_deadlines(
            lookup,
            Duration::from_millis(DEFAULT_DNS_INNER_TIMEOUT_MS),
            Duration::from_millis(DEFAULT_DNS_OUTER_TIMEOUT_MS),
        )
    }

    /// Creates a resolver with explicit deadlines. `inner_timeout` should be
    /// shorter than `outer_timeout`.
    pub fn with_deadlines(
        lookup: Arc<dyn ReverseLookup>,
        inner_timeout: Duration,
        outer_timeout: Duration,
    ) -> Self {
        if inner_timeout >= outer_timeout {
            log::warn!(
                "DNS inner deadline {:?} is not shorter than outer deadline {:?}",
                inner_timeout,
                outer_timeout
            );
        }
        Self {
            lookup,
            inner_timeout,
            outer_timeout,
        }
    }

    /// Performs a reverse DNS lookup (PTR record) for an IP address.
    ///
    /// Returns the first name without its trailing root dot, or an empty
    /// string if there is no record, the lookup fails, or a deadline passes.
    /// Never waits longer than the outer deadline.
    pub async fn resolve(&self, ip: IpAddr) -> String {
        let lookup = self.lookup.lookup_ptr(ip);
        let inner_timeout = self.inner_timeout;
        let task = tokio::spawn(async move { tokio::time::timeout(inner_timeout, lookup).await });

        match tokio::time::timeout(self.outer_timeout, task).await {
            Ok(Ok(Ok(Ok(names)))) => first_hostname(names),
            Ok(Ok(Ok(Err(e)))) => {
                log::debug!("Reverse DNS lookup failed for {ip}: {e}");
                String::new()
            }
            Ok(Ok(Err(_))) => {
                log::debug!("Reverse DNS lookup for {ip} exceeded {inner_timeout:?}");
                String::new()
            }
            Ok(Err(e)) => {
                log::warn!("Reverse DNS task for {ip} failed: {e}");
                String::new()
            }
            Err(_) => {
                // Dropping the JoinHandle detaches the task; it is not aborted.
                log::debug!(
                    "Reverse DNS lookup for {ip} abandoned after {:?}",
                    self.outer_timeout
                );
                String::new()
            }
        }
    }
}

fn first_hostname(names: Vec<String>) -> String {
    match names.into_iter().next() {
        Some(name) => name.strip_suffix('.').map(str::to_owned).unwrap_or(name),
        None => String::new(),
    }
}
