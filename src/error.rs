//! Error types for series-dl
//!
//! This module provides error handling for the library, including:
//! - A top-level [`Error`] with contextual variants
//! - A nested [`ArchiveError`] for archive packaging faults
//! - The crate-wide [`Result`] alias
//!
//! Per-fetch and per-index failures never escape the orchestrator; they are
//! converted to reported outcomes. Only configuration errors are returned to
//! the caller before a run starts.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for series-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for series-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "url_template")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Retry budget exhausted by transport-level failures for a single fetch
    #[error("retries exhausted after {attempts} attempts: {url}")]
    RetriesExhausted {
        /// The URL whose fetch kept failing
        url: String,
        /// Total number of attempts made (initial attempt plus retries)
        attempts: u32,
    },

    /// Archive packaging error
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Invalid CSS selector in the media extractor configuration
    #[error("invalid media selector: {0}")]
    Selector(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Construct a configuration error for the given key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Archive packaging errors
///
/// Archiving is all-or-nothing: on any of these, the partially written
/// archive has been discarded and the working directory is preserved.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to create the archive file itself
    #[error("failed to create archive {archive}: {reason}")]
    CreateFailed {
        /// Path of the archive that could not be created
        archive: PathBuf,
        /// Underlying failure description
        reason: String,
    },

    /// Failed to write one file into the archive
    #[error("failed to add {file} to archive {archive}: {reason}")]
    EntryFailed {
        /// Path of the archive being written
        archive: PathBuf,
        /// Path of the file that could not be added
        file: PathBuf,
        /// Underlying failure description
        reason: String,
    },

    /// Archive was written but the working directory could not be removed
    #[error("failed to remove working directory {dir}: {reason}")]
    CleanupFailed {
        /// The working directory that survived cleanup
        dir: PathBuf,
        /// Underlying failure description
        reason: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = Error::config("start_index 5 exceeds end_index 2", "start_index");
        assert_eq!(
            err.to_string(),
            "configuration error: start_index 5 exceeds end_index 2"
        );
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("start_index")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn retries_exhausted_reports_url_and_attempts() {
        let err = Error::RetriesExhausted {
            url: "http://example.com/page-001".to_string(),
            attempts: 4,
        };
        assert_eq!(
            err.to_string(),
            "retries exhausted after 4 attempts: http://example.com/page-001"
        );
    }

    #[test]
    fn archive_error_converts_into_error() {
        let err: Error = ArchiveError::CreateFailed {
            archive: PathBuf::from("out.zip"),
            reason: "permission denied".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Archive(_)));
        assert!(err.to_string().contains("out.zip"));
    }
}
