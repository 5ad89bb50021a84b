//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_DATA_DIR, DEFAULT_DNS_INNER_TIMEOUT_MS, DEFAULT_DNS_OUTER_TIMEOUT_MS,
    DEFAULT_LISTEN_ADDR, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_STALE_AFTER_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Parsed from the command line by `clap`, and constructible programmatically
/// through `Default` for tests and embedding.
///
/// # Examples
///
/// ```bash
/// # Serve on the default port with databases in the current directory
/// ipscope
///
/// # Keep databases elsewhere and refresh every 6 hours
/// ipscope --data-dir /var/lib/ipscope --refresh-interval-secs 21600
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ipscope",
    about = "Answers who/where an IP address is from locally cached GeoLite2 databases."
)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Directory holding the GeoLite2 .mmdb files
    #[arg(long, value_parser, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Seconds between periodic database update checks
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
    pub refresh_interval_secs: u64,

    /// Local file age (seconds) after which a dataset is re-downloaded when
    /// the remote does not report Last-Modified
    #[arg(long, default_value_t = DEFAULT_STALE_AFTER_SECS)]
    pub stale_after_secs: u64,

    /// Delay (milliseconds) before the warm database load at startup
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Deadline (milliseconds) for the reverse DNS lookup itself
    #[arg(long, default_value_t = DEFAULT_DNS_INNER_TIMEOUT_MS)]
    pub dns_inner_timeout_ms: u64,

    /// Deadline (milliseconds) a request waits for a hostname
    #[arg(long, default_value_t = DEFAULT_DNS_OUTER_TIMEOUT_MS)]
    pub dns_outer_timeout_ms: u64,

    /// Serve the databases already on disk without checking for updates
    #[arg(long)]
    pub no_refresh: bool,
}

impl Config {
    /// Interval between periodic refresh cycles.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Age threshold used when the remote exposes no `Last-Modified`.
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Delay before the warm load at startup.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Inner and outer reverse DNS deadlines.
    pub fn dns_deadlines(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.dns_inner_timeout_ms),
            Duration::from_millis(self.dns_outer_timeout_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            dns_inner_timeout_ms: DEFAULT_DNS_INNER_TIMEOUT_MS,
            dns_outer_timeout_ms: DEFAULT_DNS_OUTER_TIMEOUT_MS,
            no_refresh: false,
        }
    }
}
