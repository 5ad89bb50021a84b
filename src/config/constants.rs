//! Configuration constants.
//!
//! This module defines the timeouts, intervals and file names used throughout
//! the service. Everything that `Config` can override has its default here.

use std::time::Duration;

/// Default listen address for the HTTP server
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default directory holding the GeoLite2 database files
pub const DEFAULT_DATA_DIR: &str = ".";

// Refresh pipeline
/// Timeout for the metadata-only HEAD probe against a dataset URL
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for downloading a full dataset
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Local file age after which a dataset is refreshed when the remote
/// does not expose `Last-Modified` (7 days)
pub const DEFAULT_STALE_AFTER_SECS: u64 = 7 * 24 * 60 * 60;
/// Interval between periodic refresh cycles (1 hour)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;
/// Delay between starting the scheduler and the warm database load
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2_000;
/// Maximum dataset download size in bytes (512MB)
/// GeoLite2-City is roughly 60MB; anything far larger is not a database
pub const MAX_DATASET_DOWNLOAD_SIZE: u64 = 512 * 1024 * 1024;
/// Suffix for the staging file a download is written to
pub const STAGING_SUFFIX: &str = "tmp";

// Reverse DNS
/// Deadline for the reverse lookup itself
pub const DEFAULT_DNS_INNER_TIMEOUT_MS: u64 = 40;
/// Deadline the caller waits for a hostname, covering resolvers that do not
/// honor the inner deadline promptly
pub const DEFAULT_DNS_OUTER_TIMEOUT_MS: u64 = 50;

/// User-Agent sent on probe and download requests
pub const USER_AGENT: &str = concat!("ipscope/", env!("CARGO_PKG_VERSION"));
