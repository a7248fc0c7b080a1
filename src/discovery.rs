//! Year discovery and page resolution
//!
//! For year-qualified jobs the page URL depends on a year that is not
//! known up front: the first issue of a volume may have landed in the
//! configured start year or one of the following ones. Discovery probes
//! candidate years in order until a page resolves or the probe budget is
//! spent.
//!
//! State machine per index: `Probing(year)` transitions to `Found` on a
//! success status, to `Probing(year + 1)` on a well-formed non-success
//! status, and terminates when `max_year_probes` candidates are used up.
//! Transport-level retry exhaustion ends discovery with a reason distinct
//! from "page absent"; the orchestrator skips the index either way.

use crate::config::JobConfig;
use crate::fetch::HttpFetcher;
use crate::template;
use crate::types::PageResolution;
use tracing::{debug, info, warn};

/// Resolve the page for `index`, probing successive years when the job is
/// year-qualified
pub async fn discover_page(
    fetcher: &HttpFetcher,
    job: &JobConfig,
    index: u32,
    max_year_probes: u32,
) -> PageResolution {
    let Some(year_start) = job.year_start else {
        let url = template::resolve(&job.url_template, index, job.zero_padding, None);
        return probe(fetcher, &url, index, None).await;
    };

    let mut year = year_start;
    for _ in 0..max_year_probes {
        let url = template::resolve(&job.url_template, index, job.zero_padding, Some(year));
        match probe(fetcher, &url, index, Some(year)).await {
            PageResolution::NotFound => {
                debug!(index, year, "page absent for year, trying the next");
                year += 1;
            }
            resolution => return resolution,
        }
    }

    info!(
        index,
        year_start, max_year_probes, "year probes exhausted without a page"
    );
    PageResolution::NotFound
}

/// One probe: fetch a candidate URL and classify the result
async fn probe(
    fetcher: &HttpFetcher,
    url: &str,
    index: u32,
    year: Option<i32>,
) -> PageResolution {
    debug!(index, year, url, "probing page");
    match fetcher.get_page(url).await {
        Ok(page) if page.is_success() => PageResolution::Found {
            url: url.to_string(),
            year,
            body: page.body,
        },
        Ok(page) => {
            debug!(index, url, status = page.status.as_u16(), "page absent");
            PageResolution::NotFound
        }
        Err(e) => {
            warn!(index, url, error = %e, "page fetch failed");
            PageResolution::RetriesExhausted
        }
    }
}
