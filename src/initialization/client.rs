//! HTTP client initialization.

use crate::config::USER_AGENT;
use crate::error_handling::InitializationError;
use reqwest::ClientBuilder;

/// Initializes the HTTP client used for dataset probes and downloads.
///
/// No client-wide timeout is set: the HEAD probe and the GET download carry
/// their own per-request timeouts.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new().user_agent(USER_AGENT).build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client() {
        assert!(init_client().is_ok());
    }
}
