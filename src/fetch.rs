//! HTTP fetch layer
//!
//! [`HttpFetcher`] owns a configured [`reqwest::Client`] and wraps page
//! fetches in the retry policy. HTTP error statuses are returned to the
//! caller as successful fetches; only transport-level faults are retried
//! and, once the budget is spent, surfaced as
//! [`Error::RetriesExhausted`].

use crate::config::{FetchConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::{IsRetryable, retry_with_backoff};
use reqwest::StatusCode;
use tracing::debug;

/// One fetched page: the final status plus the body text
#[derive(Debug)]
pub struct PageResponse {
    /// HTTP status the server answered with
    pub status: StatusCode,
    /// Body text; empty for non-success statuses
    pub body: String,
}

impl PageResponse {
    /// True when the server answered with a success status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client with retry-wrapped fetch operations
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Build a fetcher from client and retry configuration
    pub fn new(fetch: &FetchConfig, retry: RetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch.timeout)
            .user_agent(fetch.user_agent.clone())
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client, retry })
    }

    /// GET a page, retrying transport-level failures only
    ///
    /// A well-formed HTTP error response (e.g., 404) is a successful fetch
    /// from this layer's point of view: it comes back as `Ok` carrying the
    /// status, unretried, so callers can tell "page absent" from "network
    /// flaky".
    pub async fn get_page(&self, url: &str) -> Result<PageResponse> {
        debug!(url, "fetching page");
        let client = &self.client;
        let result = retry_with_backoff(&self.retry, move || async move {
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Ok(PageResponse {
                    status,
                    body: String::new(),
                });
            }
            let body = response.text().await?;
            Ok(PageResponse { status, body })
        })
        .await;
        result.map_err(|e| self.terminal_fetch_error(e, url))
    }

    /// Map a post-retry error into its terminal form
    ///
    /// A retryable error surviving the retry loop means the budget is
    /// spent; anything else passes through unchanged.
    pub(crate) fn terminal_fetch_error(&self, error: Error, url: &str) -> Error {
        if error.is_retryable() {
            Error::RetriesExhausted {
                url: url.to_string(),
                attempts: self.retry.max_attempts + 1,
            }
        } else {
            error
        }
    }

    /// The underlying client, for callers that manage their own request
    /// lifecycle (the size-gated downloader streams bodies itself)
    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The retry policy this fetcher was built with
    pub(crate) fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}
