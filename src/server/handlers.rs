//! Lookup handler.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::types::{AppState, ErrorResponse};
use crate::lookup::LookupService;

const FORWARDING_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Answers `GET /{ip}`, or `GET /` for the caller's own address.
pub async fn lookup_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let requested = uri.path().trim_matches('/');
    let input = if requested.is_empty() {
        client_address(&headers, peer.map(|ConnectInfo(addr)| addr))
    } else {
        requested.to_string()
    };
    respond(&state.lookups, &input).await
}

/// Runs one lookup and renders it.
pub async fn respond(lookups: &LookupService, input: &str) -> Response {
    match lookups.produce_result(input).await {
        Ok(details) => pretty_json(StatusCode::OK, &details),
        Err(e) => {
            log::debug!("Rejected lookup: {}", e);
            pretty_json(StatusCode::NOT_FOUND, &ErrorResponse::wrong_ip())
        }
    }
}

/// Picks the caller's address from proxy headers, falling back to the peer.
///
/// The first entry of `X-Forwarded-For` wins, then `X-Real-IP`, then
/// `CF-Connecting-IP`. Returns an empty string when nothing is known.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in FORWARDING_HEADERS {
        let value = headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .unwrap_or_default();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn pretty_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string_pretty(body) {
        Ok(json) => (status, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.9:51234".parse().unwrap())
    }

    #[test]
    fn test_client_address_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 8.8.8.8 , 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("1.1.1.1"));
        assert_eq!(client_address(&headers, peer()), "8.8.8.8");
    }

    #[test]
    fn test_client_address_header_order() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_address(&headers, peer()), "9.9.9.9");

        headers.insert("x-real-ip", HeaderValue::from_static("1.1.1.1"));
        assert_eq!(client_address(&headers, peer()), "1.1.1.1");
    }

    #[test]
    fn test_client_address_skips_empty_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_address(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn test_client_address_without_anything() {
        assert_eq!(client_address(&HeaderMap::new(), None), "");
    }

    #[test]
    fn test_client_address_ipv6_peer() {
        let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
        assert_eq!(client_address(&HeaderMap::new(), Some(peer)), "2001:db8::1");
    }
}
