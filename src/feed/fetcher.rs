use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use super::parser::{parse_first_entry, FeedEntry};
use crate::util::{validate_url, UrlValidationError};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching the newest feed entry.
///
/// Network trouble, an unhealthy feed host, and unusable feed content are
/// kept apart so callers and tests can tell them apart.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed host answered with something other than 200 OK
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// The feed parsed but contains no entries
    #[error("Feed has no entries")]
    EmptyFeed,
    /// The first entry carries no link to republish
    #[error("First feed entry has no link")]
    MissingLink,
}

/// Fetches `url` and returns its first entry.
///
/// Anything but exactly `200 OK` fails the liveness check. There are no
/// retries: one invocation makes one attempt.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - Not an http(s) URL
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request exceeded `timeout`
/// - [`FetchError::HttpStatus`] - Non-200 HTTP response
/// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
/// - [`FetchError::Parse`], [`FetchError::EmptyFeed`], [`FetchError::MissingLink`] -
///   The body is not a usable feed
pub async fn fetch_latest(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<FeedEntry, FetchError> {
    let url = validate_url(url)?;

    let response = tokio::time::timeout(timeout, client.get(url.as_str()).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = tokio::time::timeout(timeout, read_limited_bytes(response, MAX_FEED_SIZE))
        .await
        .map_err(|_| FetchError::Timeout)??;

    let entry = parse_first_entry(&bytes)?;
    tracing::debug!(feed = %url, link = %entry.link, "Fetched newest feed entry");
    Ok(entry)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
