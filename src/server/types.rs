//! Server state and response bodies.

use serde::Serialize;

use crate::lookup::LookupService;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub lookups: LookupService,
}

/// JSON body returned for addresses that do not parse.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub title: &'static str,
    pub message: &'static str,
}

impl ErrorResponse {
    pub fn wrong_ip() -> Self {
        Self {
            status: 404,
            error: ErrorDetail {
                title: "Wrong ip",
                message: "Please provide a valid IP address",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_ip_body() {
        let body = serde_json::to_value(ErrorResponse::wrong_ip()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "status": 404,
                "error": {
                    "title": "Wrong ip",
                    "message": "Please provide a valid IP address"
                }
            })
        );
    }
}
