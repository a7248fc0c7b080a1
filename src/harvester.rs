//! Page-range acquisition orchestrator
//!
//! Drives the per-index pipeline: resolve the page (probing years where
//! the job is year-qualified), extract media references, download each
//! surviving reference behind the size gate, package the working
//! directory into an archive, clean up, move on. Fully sequential; one
//! index completes before the next begins. No failure on one index ever
//! aborts the batch; every index contributes an entry to the run report.

use crate::archive;
use crate::config::{HarvesterConfig, JobConfig};
use crate::discovery;
use crate::download;
use crate::error::Result;
use crate::extract::MediaExtractor;
use crate::fetch::HttpFetcher;
use crate::template;
use crate::types::{PageOutcome, PageReport, PageResolution, RunReport};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Sequential harvester for one acquisition job
pub struct Harvester {
    config: HarvesterConfig,
    job: JobConfig,
    fetcher: HttpFetcher,
    extractor: MediaExtractor,
    cancel: CancellationToken,
}

impl Harvester {
    /// Build a harvester, validating all configuration up front
    ///
    /// Fail fast: an invalid job or harvester configuration is rejected
    /// here and nothing is fetched.
    pub fn new(config: HarvesterConfig, job: JobConfig) -> Result<Self> {
        config.validate()?;
        job.validate()?;
        let fetcher = HttpFetcher::new(&config.fetch, config.retry.clone())?;
        let extractor = MediaExtractor::new(&config.media_selector, config.url_join)?;
        Ok(Self {
            config,
            job,
            fetcher,
            extractor,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the semantic exclusion predicate used by the media
    /// extractor
    pub fn with_exclude(
        mut self,
        exclude: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.extractor = self.extractor.with_exclude(exclude);
        self
    }

    /// Token for cooperative cancellation
    ///
    /// Checked between indices only: a cancelled token lets the current
    /// page finish, then stops the run and marks the report truncated.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the whole range sequentially
    ///
    /// Returns one report entry per processed index. Only a filesystem
    /// fault creating the output directory itself is an error; everything
    /// that happens per index is captured in the report.
    pub async fn run(&self) -> Result<RunReport> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut report = RunReport::default();
        for index in self.job.start_index..=self.job.end_index {
            if self.cancel.is_cancelled() {
                info!(index, "cancellation requested, stopping before next index");
                report.cancelled = true;
                break;
            }
            report.pages.push(self.process_index(index).await);
        }

        info!(
            archived = report.archived(),
            skipped = report.skipped(),
            failed = report.failed(),
            cancelled = report.cancelled,
            "run complete"
        );
        Ok(report)
    }

    /// Process one index end to end; never fails, always reports
    async fn process_index(&self, index: u32) -> PageReport {
        let resolution = discovery::discover_page(
            &self.fetcher,
            &self.job,
            index,
            self.config.max_year_probes,
        )
        .await;

        let (url, year, body) = match resolution {
            PageResolution::Found { url, year, body } => (url, year, body),
            PageResolution::NotFound => {
                info!(index, "no page found, skipping index");
                return PageReport::skipped(index, PageOutcome::SkippedNotFound);
            }
            PageResolution::RetriesExhausted => {
                warn!(index, "retries exhausted, skipping index");
                return PageReport::skipped(index, PageOutcome::SkippedRetriesExhausted);
            }
        };

        info!(index, url = %url, "page resolved, harvesting media");
        let references = self.extractor.extract(&body, &url);

        let padded = template::pad_index(index, self.job.zero_padding);
        let working_dir = self.config.output_dir.join(format!("page_{padded}_images"));
        if let Err(e) = std::fs::create_dir_all(&working_dir) {
            warn!(index, dir = %working_dir.display(), error = %e, "failed to create working directory");
            return PageReport {
                index,
                year,
                url: Some(url),
                outcome: PageOutcome::IoFailed,
                downloads: Vec::new(),
                archive: None,
            };
        }

        let mut downloads = Vec::new();
        let mut sequence = 0usize;
        for reference in &references {
            if reference.excluded {
                info!(index, raw_url = %reference.raw_url, "excluded by semantic filter");
                continue;
            }
            let dest = working_dir.join(format!("image_{padded}_{sequence}.jpg"));
            downloads.push(
                download::download_media(&self.fetcher, reference, &dest, self.job.min_size_kb)
                    .await,
            );
            sequence += 1;
        }

        let archive_name = format!(
            "{}.zip",
            template::resolve(&self.job.name_template, index, self.job.zero_padding, year)
        );
        let archive_path = self.config.output_dir.join(&archive_name);
        match archive::archive_directory(&working_dir, &archive_path) {
            Ok(()) => {
                info!(index, archive = %archive_path.display(), "page archived");
                PageReport {
                    index,
                    year,
                    url: Some(url),
                    outcome: PageOutcome::Archived,
                    downloads,
                    archive: Some(archive_path),
                }
            }
            Err(e) => {
                warn!(index, error = %e, "archiving failed, preserving working directory");
                PageReport {
                    index,
                    year,
                    url: Some(url),
                    outcome: PageOutcome::ArchiveFailed,
                    downloads,
                    archive: None,
                }
            }
        }
    }
}
