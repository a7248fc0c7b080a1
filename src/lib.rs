//! # series-dl
//!
//! Sequential harvesting library for numbered series of web pages:
//! resolves a templated URL per index, probes successive years for
//! year-qualified series, scrapes embedded media from each resolved page,
//! downloads it behind a declared-size gate, and packages every page's
//! haul into its own archive.
//!
//! ## Design Philosophy
//!
//! series-dl is designed to be:
//! - **Highly configurable** - Retry policy, probe bounds, filtering and
//!   URL resolution are all explicit configuration
//! - **Sensible defaults** - A job plus `HarvesterConfig::default()` works
//! - **Library-first** - No CLI or prompts, purely a Rust crate for
//!   embedding
//! - **Batch-tolerant** - One bad index never aborts a run; outcomes land
//!   in a structured per-index report
//!
//! ## Quick Start
//!
//! ```no_run
//! use series_dl::{Harvester, HarvesterConfig, JobConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let job = JobConfig {
//!         url_template: "https://example.com/scooby-apocalypse-{n}-{year}/".to_string(),
//!         start_index: 1,
//!         end_index: 25,
//!         year_start: Some(2016),
//!         zero_padding: 3,
//!         min_size_kb: Some(100),
//!         name_template: "scooby-apocalypse-{n}-{year}".to_string(),
//!     };
//!
//!     let harvester = Harvester::new(HarvesterConfig::default(), job)?;
//!     let report = harvester.run().await?;
//!
//!     println!("archived {} of {} pages", report.archived(), report.pages.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Zip packaging of per-page working directories
pub mod archive;
/// Configuration types
pub mod config;
/// Year discovery and page resolution
pub mod discovery;
/// Size-gated media download
pub mod download;
/// Error types
pub mod error;
/// Media reference extraction and filtering
pub mod extract;
/// HTTP fetch layer
pub mod fetch;
/// Page-range orchestration
pub mod harvester;
/// Retry logic with exponential backoff
pub mod retry;
/// URL and name template resolution
pub mod template;
/// Core types and run reports
pub mod types;

// Re-export commonly used types
pub use config::{FetchConfig, HarvesterConfig, JobConfig, RetryConfig, UrlJoinStrategy};
pub use error::{ArchiveError, Error, Result};
pub use harvester::Harvester;
pub use types::{
    DownloadOutcome, DownloadStatus, MediaReference, PageOutcome, PageReport, RunReport,
};
