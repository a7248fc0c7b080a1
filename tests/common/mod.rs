//! Common test utilities for series-dl integration tests

use series_dl::{FetchConfig, HarvesterConfig, RetryConfig};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Retry config with near-zero delays so failure scenarios stay fast
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

/// Harvester config writing into `output_dir` with fast retries
pub fn test_config(output_dir: &Path) -> HarvesterConfig {
    HarvesterConfig {
        output_dir: output_dir.to_path_buf(),
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            ..FetchConfig::default()
        },
        retry: fast_retry(1),
        ..HarvesterConfig::default()
    }
}

/// Minimal page body embedding the given image sources in order
pub fn page_body<S: AsRef<str>>(img_srcs: &[S]) -> String {
    let imgs: String = img_srcs
        .iter()
        .map(|src| format!("<img src=\"{}\">\n", src.as_ref()))
        .collect();
    format!("<html><body><h1>Issue</h1>\n{imgs}</body></html>")
}

/// Entry names inside a zip archive, in archive order
#[allow(clippy::unwrap_used)]
pub fn archive_entries(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
