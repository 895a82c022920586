//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with user agent and timeouts
//! - GET requests for the index page and subpages
//! - Streaming file transfers through a partial file

use crate::config::HttpConfig;
use crate::download::partial_path;
use crate::HarvestError;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Result of a page fetch that reached the server
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 200
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The server answered with any other status
    HttpStatus {
        /// The HTTP status code
        status_code: u16,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops). Per-request timeouts are applied
/// by the callers, since page requests and file transfers use different
/// budgets.
///
/// # Example
///
/// ```no_run
/// use book_harvest::config::HttpConfig;
/// use book_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// Only HTTP 200 counts as success; every other status is reported as
/// `FetchResult::HttpStatus` so the caller can decide whether it is fatal.
///
/// # Returns
///
/// * `Ok(FetchResult)` - The server answered
/// * `Err(HarvestError::Http)` - Connection, timeout or body read failure
pub async fn fetch_page(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchResult, HarvestError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Ok(FetchResult::HttpStatus {
            status_code: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchResult::Success { final_url, body })
}

/// Streams a remote file to `destination`
///
/// # Transfer Flow
///
/// 1. GET the source; anything but 200 is `HarvestError::Status` and nothing
///    is written
/// 2. Write chunks to `<destination>.<partial_suffix>`
/// 3. Flush and rename the partial file to `destination`
///
/// A failure during step 2 or 3 removes the partial file before returning. If the
/// process itself dies, the partial file stays behind for the sweeper.
///
/// # Returns
///
/// * `Ok(u64)` - Number of bytes written
/// * `Err(HarvestError)` - Transfer or filesystem failure
pub async fn download_file(
    client: &Client,
    url: &str,
    destination: &Path,
    partial_suffix: &str,
    timeout: Duration,
) -> Result<u64, HarvestError> {
    let mut response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let partial = partial_path(destination, partial_suffix);
    let mut file = File::create(&partial).await?;

    let streamed = stream_to_file(&mut response, &mut file, url).await;
    drop(file);

    let result = match streamed {
        Ok(bytes) => tokio::fs::rename(&partial, destination)
            .await
            .map(|()| bytes)
            .map_err(HarvestError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(bytes) => {
            tracing::debug!("Promoted {} to {}", partial.display(), destination.display());
            Ok(bytes)
        }
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                tracing::warn!(
                    "Failed to remove partial download {}: {}",
                    partial.display(),
                    remove_err
                );
            }
            Err(e)
        }
    }
}

async fn stream_to_file(
    response: &mut Response,
    file: &mut File,
    url: &str,
) -> Result<u64, HarvestError> {
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
