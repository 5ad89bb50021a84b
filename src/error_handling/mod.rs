//! Error handling.
//!
//! Errors are categorized by who sees them:
//! - **Input errors**: unparseable addresses, returned to the request caller
//! - **Store errors**: database open/decode failures, logged and degraded
//! - **Refresh errors**: probe/download/rename failures, logged and retried
//! - **Initialization errors**: startup failures of the logger, client, resolver

mod types;

// Re-export public API
pub use types::{InitializationError, InputError, RefreshError, StoreError};
