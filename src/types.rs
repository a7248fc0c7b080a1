//! Core types and run reports for series-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One media reference extracted from a page, in document order
///
/// Created per page, consumed immediately by the downloader, then discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaReference {
    /// Source attribute value as it appeared in the markup
    pub raw_url: String,
    /// Absolute URL after relative-reference resolution against the page URL
    pub resolved_url: String,
    /// True when the semantic filter rejected this reference
    pub excluded: bool,
}

/// Reporting status for one media download
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Persisted to the working directory
    Saved,
    /// Declared size below the configured threshold, or declared size absent
    /// while a threshold is configured
    SkippedSize,
    /// Server answered the media request with a non-success HTTP status
    FailedHttpStatus,
    /// Transport-level failures persisted through the whole retry budget
    FailedRetriesExhausted,
    /// Local filesystem error while persisting the body
    FailedIo,
}

/// Result of one media download, used for reporting only
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Resolved URL of the media resource
    pub url: String,
    /// Declared size in KB, if the server sent one
    pub size_kb: Option<f64>,
    /// What happened to this reference
    pub status: DownloadStatus,
}

/// Resolution of one range index, produced by year discovery
///
/// Transient: exists only between page resolution and archiving, never
/// persisted or reported directly.
#[derive(Debug)]
pub enum PageResolution {
    /// A candidate URL answered with a success status
    Found {
        /// The resolved page URL
        url: String,
        /// The year that resolved, for year-qualified jobs
        year: Option<i32>,
        /// The page body, handed straight to the media extractor
        body: String,
    },
    /// Every candidate answered with a well-formed non-success status
    NotFound,
    /// Transport-level retries were exhausted before any candidate resolved
    RetriesExhausted,
}

/// Terminal outcome for one range index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    /// Media archived and the working directory removed
    Archived,
    /// No candidate page resolved; index skipped
    SkippedNotFound,
    /// Transport retries exhausted before a page resolved; index skipped
    SkippedRetriesExhausted,
    /// Archive creation failed; working directory preserved for inspection
    ArchiveFailed,
    /// Local filesystem fault before archiving (e.g., working directory
    /// could not be created)
    IoFailed,
}

/// Per-index report entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// The range index this entry covers
    pub index: u32,
    /// The year that resolved, for year-qualified jobs
    pub year: Option<i32>,
    /// The resolved page URL, when one was found
    pub url: Option<String>,
    /// Terminal outcome for this index
    pub outcome: PageOutcome,
    /// One entry per non-excluded media reference, in document order
    pub downloads: Vec<DownloadOutcome>,
    /// Path of the written archive, when one was produced
    pub archive: Option<PathBuf>,
}

impl PageReport {
    /// Report entry for an index that was skipped before any page resolved
    pub(crate) fn skipped(index: u32, outcome: PageOutcome) -> Self {
        Self {
            index,
            year: None,
            url: None,
            outcome,
            downloads: Vec::new(),
            archive: None,
        }
    }
}

/// Whole-run report, one entry per processed index
///
/// The run always completes unless configuration is invalid; individual
/// index failures show up here rather than as errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-index outcomes in range order
    pub pages: Vec<PageReport>,
    /// True when the run stopped early on cooperative cancellation
    pub cancelled: bool,
}

impl RunReport {
    /// Number of indices that produced an archive
    pub fn archived(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.outcome == PageOutcome::Archived)
            .count()
    }

    /// Number of indices that were skipped without producing output
    pub fn skipped(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| {
                matches!(
                    p.outcome,
                    PageOutcome::SkippedNotFound | PageOutcome::SkippedRetriesExhausted
                )
            })
            .count()
    }

    /// Number of indices that failed locally (archiving or filesystem)
    pub fn failed(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p.outcome, PageOutcome::ArchiveFailed | PageOutcome::IoFailed))
            .count()
    }
}
