//! Retry logic with exponential backoff
//!
//! Transient transport failures are retried up to a configured bound with
//! exponentially growing, capped delays and optional jitter. The bound is
//! explicit configuration rather than a hardcoded constant so tests can
//! inject zero-delay variants.
//!
//! A well-formed HTTP error response is not a failure at this layer: the
//! fetchers return it as a successful result carrying the status, so it is
//! never retried. That distinction is what lets year discovery tell "page
//! absent" apart from "network flaky".

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient faults (timeouts, connection refused/reset) should return
/// `true`. Permanent faults (invalid configuration, local I/O on a bad
/// path) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be
    /// retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Transport-level faults only; an HTTP error status never
            // reaches this path because fetchers report it as success
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Configuration errors are permanent
            Error::Config { .. } => false,
            // Already the terminal form of a transient failure
            Error::RetriesExhausted { .. } => false,
            // Archive and selector errors are local, not transient
            Error::Archive(_) | Error::Selector(_) => false,
            // Serialization errors are permanent
            Error::Serialization(_) => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// `operation` is attempted once plus up to `config.max_attempts` retries,
/// but only while it fails with a retryable error. The last error is
/// returned after the budget is exhausted or on the first non-retryable
/// failure.
pub async fn retry_with_backoff<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// Uniformly distributed between 0% and 100% of the delay, so the actual
/// delay lands between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
