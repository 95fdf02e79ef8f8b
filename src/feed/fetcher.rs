use futures::StreamExt;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while downloading the feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the configured size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Limits applied to the single feed request.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Time allowed for the server to answer with response headers.
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// What the feed endpoint answered.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Status 200 with the full response body.
    Document(Vec<u8>),
    /// Any status other than exactly 200. The body is not read.
    NotOk(StatusCode),
}

/// Fetches the feed document with a single GET request.
///
/// Only a `200 OK` counts as success; every other status, including other
/// 2xx codes, is reported as [`FetchOutcome::NotOk`] so the caller can stay
/// silent. There are no retries.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS or body read errors
/// - [`FetchError::Timeout`] - No response within `settings.timeout`
/// - [`FetchError::ResponseTooLarge`] - Body exceeded `settings.max_bytes`
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    settings: &FetchSettings,
) -> Result<FetchOutcome, FetchError> {
    let response = tokio::time::timeout(settings.timeout, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout(settings.timeout))??;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!(url = %url, status = %status, "Feed request did not return 200");
        return Ok(FetchOutcome::NotOk(status));
    }

    let bytes = read_limited_bytes(response, settings.max_bytes).await?;
    tracing::debug!(url = %url, bytes = bytes.len(), "Feed document downloaded");
    Ok(FetchOutcome::Document(bytes))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: reject on Content-Length before streaming anything
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
