//! Size-gated media download
//!
//! Fetches one media resource and persists it only when its declared
//! Content-Length meets the configured minimum. The declared size is
//! inspected before the body is consumed, so rejected media never costs
//! the bandwidth of its payload. Failures of any kind become a reported
//! outcome; a page is never aborted by one of its media.

use crate::error::Error;
use crate::fetch::HttpFetcher;
use crate::retry::{IsRetryable, retry_with_backoff};
use crate::types::{DownloadOutcome, DownloadStatus, MediaReference};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// What one download attempt concluded, before retry mapping
enum Attempt {
    Saved { size_kb: Option<f64> },
    SkippedSize { size_kb: Option<f64> },
    HttpError { status: u16 },
}

/// Whether a response with `content_length` declared bytes passes the
/// size gate
///
/// No threshold accepts everything. With a threshold set, a missing
/// declared size is treated as not meeting it: the media is skipped, never
/// guessed at. The boundary case (declared size exactly at the threshold)
/// is accepted.
fn passes_size_gate(content_length: Option<u64>, min_size_kb: Option<u64>) -> bool {
    match (min_size_kb, content_length) {
        (None, _) => true,
        (Some(min), Some(bytes)) => bytes as f64 / 1024.0 >= min as f64,
        (Some(_), None) => false,
    }
}

/// Download one media resource to `dest`, gated by `min_size_kb`
///
/// Streams the body to disk on acceptance. Retries transport-level faults
/// per the fetcher's policy; an HTTP error status, a size-gate rejection,
/// and retry exhaustion all come back as their respective
/// [`DownloadStatus`], never as an error.
pub async fn download_media(
    fetcher: &HttpFetcher,
    reference: &MediaReference,
    dest: &Path,
    min_size_kb: Option<u64>,
) -> DownloadOutcome {
    let url = reference.resolved_url.as_str();
    let client = fetcher.client();
    let result = retry_with_backoff(fetcher.retry(), move || async move {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Attempt::HttpError {
                status: status.as_u16(),
            });
        }

        let content_length = response.content_length();
        let size_kb = content_length.map(|bytes| bytes as f64 / 1024.0);
        if !passes_size_gate(content_length, min_size_kb) {
            return Ok(Attempt::SkippedSize { size_kb });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok::<_, Error>(Attempt::Saved { size_kb })
    })
    .await;

    let (size_kb, status) = match result {
        Ok(Attempt::Saved { size_kb }) => {
            info!(url, size_kb, dest = %dest.display(), "saved media");
            (size_kb, DownloadStatus::Saved)
        }
        Ok(Attempt::SkippedSize { size_kb }) => {
            info!(url, size_kb, min_size_kb, "skipped media below size threshold");
            (size_kb, DownloadStatus::SkippedSize)
        }
        Ok(Attempt::HttpError { status }) => {
            warn!(url, status, "media request failed");
            (None, DownloadStatus::FailedHttpStatus)
        }
        Err(e) => {
            let status = if !e.is_retryable() && matches!(e, Error::Io(_)) {
                DownloadStatus::FailedIo
            } else {
                DownloadStatus::FailedRetriesExhausted
            };
            warn!(url, error = %e, "media download failed");
            (None, status)
        }
    };

    DownloadOutcome {
        url: url.to_string(),
        size_kb,
        status,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, RetryConfig};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> HttpFetcher {
        let retry = RetryConfig {
            max_attempts: 1,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        };
        HttpFetcher::new(&FetchConfig::default(), retry).unwrap()
    }

    fn reference(url: String) -> MediaReference {
        MediaReference {
            raw_url: url.clone(),
            resolved_url: url,
            excluded: false,
        }
    }

    #[test]
    fn size_gate_is_monotonic_with_boundary_acceptance() {
        // No threshold accepts everything
        assert!(passes_size_gate(Some(1), None));
        assert!(passes_size_gate(None, None));

        // S >= T saves, including S == T exactly
        assert!(passes_size_gate(Some(150 * 1024), Some(100)));
        assert!(passes_size_gate(Some(100 * 1024), Some(100)));
        assert!(!passes_size_gate(Some(100 * 1024 - 1), Some(100)));
        assert!(!passes_size_gate(Some(50 * 1024), Some(100)));

        // Missing declared size with a threshold set is a skip, not a guess
        assert!(!passes_size_gate(None, Some(1)));
    }

    #[tokio::test]
    async fn saves_media_meeting_the_threshold() {
        let mock_server = MockServer::start().await;
        let body = vec![0u8; 150 * 1024];
        Mock::given(method("GET"))
            .and(path("/cover.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("image_001_0.jpg");
        let outcome = download_media(
            &test_fetcher(),
            &reference(format!("{}/cover.jpg", mock_server.uri())),
            &dest,
            Some(100),
        )
        .await;

        assert_eq!(outcome.status, DownloadStatus::Saved);
        assert_eq!(outcome.size_kb, Some(150.0));
        assert_eq!(std::fs::read(&dest).unwrap().len(), 150 * 1024);
    }

    #[tokio::test]
    async fn skips_media_below_the_threshold_without_writing() {
        let mock_server = MockServer::start().await;
        let body = vec![0u8; 50 * 1024];
        Mock::given(method("GET"))
            .and(path("/small.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("image_001_0.jpg");
        let outcome = download_media(
            &test_fetcher(),
            &reference(format!("{}/small.jpg", mock_server.uri())),
            &dest,
            Some(100),
        )
        .await;

        assert_eq!(outcome.status, DownloadStatus::SkippedSize);
        assert_eq!(outcome.size_kb, Some(50.0));
        assert!(!dest.exists(), "skipped media must not be written");
    }

    #[tokio::test]
    async fn saves_unconditionally_without_threshold() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tiny.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("image_001_0.jpg");
        let outcome = download_media(
            &test_fetcher(),
            &reference(format!("{}/tiny.jpg", mock_server.uri())),
            &dest,
            None,
        )
        .await;

        assert_eq!(outcome.status, DownloadStatus::Saved);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn http_error_status_is_reported_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("image_001_0.jpg");
        let outcome = download_media(
            &test_fetcher(),
            &reference(format!("{}/gone.jpg", mock_server.uri())),
            &dest,
            None,
        )
        .await;

        assert_eq!(outcome.status, DownloadStatus::FailedHttpStatus);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn connection_refused_reports_retries_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("image_001_0.jpg");
        let outcome = download_media(
            &test_fetcher(),
            &reference("http://127.0.0.1:9/cover.jpg".to_string()),
            &dest,
            None,
        )
        .await;

        assert_eq!(outcome.status, DownloadStatus::FailedRetriesExhausted);
        assert!(!dest.exists());
    }
}
