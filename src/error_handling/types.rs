//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::geoip::DatasetKind;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Address strings that cannot be served.
///
/// This is the only error a request caller ever sees; dataset and DNS problems
/// degrade fields to empty instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The string is not an IPv4 or IPv6 address.
    #[error("Invalid IP address: {0:?}")]
    InvalidAddress(String),
}

/// Error types for reference database handling.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database file could not be read or parsed.
    #[error("Failed to open {kind} database {path:?}: {reason}")]
    Open {
        /// Dataset the file belongs to
        kind: DatasetKind,
        /// Path that was opened
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// A record exists but could not be decoded.
    #[error("Failed to decode {kind} record: {reason}")]
    Decode {
        /// Dataset that was queried
        kind: DatasetKind,
        /// Underlying failure
        reason: String,
    },

    /// A thread panicked while holding the handle lock.
    #[error("Reference store lock poisoned: {0}")]
    LockPoisoned(String),

    /// The blocking task that reopens databases panicked or was cancelled.
    #[error("Database reload task failed: {0}")]
    ReloadTask(String),
}

/// Error types for one dataset's refresh cycle.
///
/// Every variant is logged by the scheduler and retried on the next tick;
/// none reaches request handlers.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The download request failed (connect, timeout, body).
    #[error("Failed to download {url}: {source}")]
    Download {
        /// Remote URL
        url: String,
        /// Underlying HTTP error
        #[source]
        source: ReqwestError,
    },

    /// The remote answered with a non-success status.
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus {
        /// Remote URL
        url: String,
        /// Status returned
        status: reqwest::StatusCode,
    },

    /// The body exceeded the download size limit.
    #[error("Dataset from {url} too large: over {limit} bytes")]
    TooLarge {
        /// Remote URL
        url: String,
        /// Limit that was exceeded
        limit: u64,
    },

    /// Writing the staging file failed.
    #[error("Failed to write {path:?}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The staging file could not be renamed over the live file.
    #[error("Failed to replace {path:?}: {source}")]
    Rename {
        /// Live file that should have been replaced
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store could not be updated after the file was installed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
