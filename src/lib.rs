//! ipscope library: who/where an IP address is from.
//!
//! Addresses are classified (bogon or routable), enriched from locally cached
//! GeoLite2 databases, and given a best-effort reverse DNS name. The
//! databases are refreshed in the background and swapped in without
//! interrupting lookups.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ipscope::geoip::{DatasetSource, MmdbOpener, ReferenceStore};
//! use ipscope::initialization::init_resolver;
//! use ipscope::LookupService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ReferenceStore::new());
//! store.reload(&MmdbOpener, &DatasetSource::defaults(), std::path::Path::new("."))?;
//!
//! let resolver = init_resolver(Duration::from_millis(40), Duration::from_millis(50));
//! let lookups = LookupService::new(store, resolver);
//!
//! let details = lookups.produce_result("8.8.8.8").await?;
//! println!("{}", serde_json::to_string_pretty(&details)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod bogon;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod geoip;
pub mod initialization;
pub mod lookup;
pub mod refresh;
pub mod server;

// Re-export public API
pub use app::run_server;
pub use bogon::is_bogon;
pub use config::{Config, LogFormat, LogLevel};
pub use dns::BoundedResolver;
pub use error_handling::{InitializationError, InputError, RefreshError, StoreError};
pub use geoip::{DatasetKind, LookupOutcome, ReferenceStore};
pub use lookup::{IpDetails, LookupService};
pub use refresh::{RefreshScheduler, SchedulerHandle};
