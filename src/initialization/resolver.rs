//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::dns::{BoundedResolver, ReverseLookup};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

/// Initializes the reverse DNS resolver.
///
/// Uses the system resolver configuration when it can be read, falling back
/// to hickory's default upstreams. The per-query timeout matches the inner
/// deadline and retries are disabled: a PTR answer that does not arrive
/// within the budget is not worth a second attempt.
pub fn init_resolver(inner_timeout: Duration, outer_timeout: Duration) -> BoundedResolver {
    let resolver = match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, opts)) => TokioAsyncResolver::tokio(config, tuned(opts, inner_timeout)),
        Err(e) => {
            log::warn!("Failed to read system DNS configuration, using defaults: {e}");
            TokioAsyncResolver::tokio(
                ResolverConfig::default(),
                tuned(ResolverOpts::default(), inner_timeout),
            )
        }
    };

    let lookup: Arc<dyn ReverseLookup> = Arc::new(resolver);
    BoundedResolver::with_deadlines(lookup, inner_timeout, outer_timeout)
}

fn tuned(mut opts: ResolverOpts, timeout: Duration) -> ResolverOpts {
    opts.timeout = timeout;
    opts.attempts = 1;
    opts
}
