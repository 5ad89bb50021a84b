//! Staleness probe: decides whether a dataset needs to be downloaded.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::LAST_MODIFIED;

/// Decides whether the local copy of a dataset should be replaced.
///
/// - No local file: `true`.
/// - Otherwise a HEAD request is sent with `probe_timeout`. Any network error,
///   timeout or non-success status returns `false`: stale data is preferred
///   over acting on a bad answer.
/// - With a `Last-Modified` header, returns whether the remote copy is newer
///   than the local file's modification time.
/// - Without one, returns whether the local file is older than `stale_after`.
pub async fn needs_update(
    client: &reqwest::Client,
    local_path: &Path,
    url: &str,
    probe_timeout: Duration,
    stale_after: Duration,
) -> bool {
    let metadata = match tokio::fs::metadata(local_path).await {
        Ok(metadata) => metadata,
        Err(_) => return true,
    };
    let local_modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            log::warn!("Cannot read modification time of {:?}: {}", local_path, e);
            return false;
        }
    };

    let response = match client.head(url).timeout(probe_timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Error checking {:?}: {}", local_path, e);
            return false;
        }
    };

    if !response.status().is_success() {
        log::warn!(
            "Error checking {:?}: HTTP {}",
            local_path,
            response.status().as_u16()
        );
        return false;
    }

    let last_modified = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match last_modified {
        None => {
            // Modification times in the future count as fresh
            let age = local_modified.elapsed().unwrap_or(Duration::ZERO);
            age > stale_after
        }
        Some(value) => match parse_http_date(&value) {
            Some(remote_modified) => remote_modified > local_modified,
            None => {
                log::warn!(
                    "Error parsing Last-Modified for {:?}: {:?}",
                    local_path,
                    value
                );
                false
            }
        },
    }
}

/// Parses an HTTP date in any of the three formats RFC 9110 allows.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();

    // IMF-fixdate: Sun, 06 Nov 1994 08:49:37 GMT
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(SystemTime::from(date.with_timezone(&Utc)));
    }

    // RFC 850: Sunday, 06-Nov-94 08:49:37 GMT
    // asctime: Sun Nov  6 08:49:37 1994
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| SystemTime::from(naive.and_utc()))
}
