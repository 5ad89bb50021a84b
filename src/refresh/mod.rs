//! Dataset refresh pipeline.
//!
//! Probe the remote copy with HEAD, download to a staging file next to the
//! live one, rename it into place, and have the reference store reopen the
//! files. Failures are logged and retried on the next tick; the previous file
//! and handle stay in service.

mod download;
mod probe;
mod scheduler;

// Re-export public API
pub use download::download_to;
pub use probe::{needs_update, parse_http_date};
pub use scheduler::{RefreshOutcome, RefreshScheduler, RefreshSettings, SchedulerHandle};
