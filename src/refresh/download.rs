//! Dataset download into a staging file.

use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::config::MAX_DATASET_DOWNLOAD_SIZE;
use crate::error_handling::RefreshError;

/// Downloads `url` into `dest`, streaming the body to disk.
///
/// `timeout` covers the whole request including the body. On any failure the
/// partially written `dest` is removed. Returns the number of bytes written.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<u64, RefreshError> {
    let result = download_inner(client, url, dest, timeout).await;
    if result.is_err() {
        // The file may not exist if the request itself failed
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

async fn download_inner(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<u64, RefreshError> {
    let download_error = |source| RefreshError::Download {
        url: url.to_string(),
        source,
    };
    let io_error = |source| RefreshError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let mut response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(download_error)?;

    if !response.status().is_success() {
        return Err(RefreshError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    // Check content-length header if available
    if let Some(content_length) = response.content_length() {
        if content_length > MAX_DATASET_DOWNLOAD_SIZE {
            return Err(RefreshError::TooLarge {
                url: url.to_string(),
                limit: MAX_DATASET_DOWNLOAD_SIZE,
            });
        }
    }

    let mut file = tokio::fs::File::create(dest).await.map_err(io_error)?;
    let mut written: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(download_error)? {
        written += chunk.len() as u64;
        // Double-check size while streaming (content-length may be missing or wrong)
        if written > MAX_DATASET_DOWNLOAD_SIZE {
            return Err(RefreshError::TooLarge {
                url: url.to_string(),
                limit: MAX_DATASET_DOWNLOAD_SIZE,
            });
        }
        file.write_all(&chunk).await.map_err(io_error)?;
    }

    file.flush().await.map_err(io_error)?;
    file.sync_all().await.map_err(io_error)?;

    log::debug!("Downloaded {} bytes from {} to {:?}", written, url, dest);
    Ok(written)
}
