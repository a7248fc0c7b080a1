//! Configuration types for series-dl

use crate::error::{Error, Result};
use crate::template;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Acquisition job: the immutable configuration for one harvesting run
///
/// Describes the numeric range, the URL and archive-name templates, and the
/// per-job filtering threshold. Validated once, before anything is fetched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    /// Page URL template with `{n}` and, for year-qualified series,
    /// `{year}` placeholders
    pub url_template: String,

    /// First index of the range (inclusive)
    pub start_index: u32,

    /// Last index of the range (inclusive)
    pub end_index: u32,

    /// First candidate year for year-qualified series; `None` means the
    /// series is not year-qualified
    #[serde(default)]
    pub year_start: Option<i32>,

    /// Width the `{n}` placeholder is zero-padded to (1 = no padding)
    #[serde(default = "default_zero_padding")]
    pub zero_padding: usize,

    /// Minimum declared media size in KB; `None` disables size filtering
    #[serde(default)]
    pub min_size_kb: Option<u64>,

    /// Archive name template with `{n}`/`{year}` placeholders, without the
    /// `.zip` extension
    pub name_template: String,
}

impl JobConfig {
    /// Validate the job before a run starts
    ///
    /// Fail fast: an invalid job aborts the whole run with a configuration
    /// error before any fetch is attempted. Checks the index range, the
    /// padding width, the presence of `{n}` in both templates, and that
    /// `{year}` only appears when `year_start` is set.
    pub fn validate(&self) -> Result<()> {
        if self.start_index > self.end_index {
            return Err(Error::config(
                format!(
                    "start_index {} exceeds end_index {}",
                    self.start_index, self.end_index
                ),
                "start_index",
            ));
        }
        if self.zero_padding < 1 {
            return Err(Error::config(
                "zero_padding must be at least 1",
                "zero_padding",
            ));
        }
        if !template::has_index_token(&self.url_template) {
            return Err(Error::config(
                "url_template must contain the {n} placeholder",
                "url_template",
            ));
        }
        if !template::has_index_token(&self.name_template) {
            return Err(Error::config(
                "name_template must contain the {n} placeholder",
                "name_template",
            ));
        }
        if self.year_start.is_none() {
            if template::has_year_token(&self.url_template) {
                return Err(Error::config(
                    "url_template references {year} but year_start is not set",
                    "url_template",
                ));
            }
            if template::has_year_token(&self.name_template) {
                return Err(Error::config(
                    "name_template references {year} but year_start is not set",
                    "name_template",
                ));
            }
        }
        Ok(())
    }

    /// True when the series needs year discovery
    pub fn is_year_qualified(&self) -> bool {
        self.year_start.is_some()
    }
}

/// HTTP client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Retry configuration for transient failures
///
/// Only transport-level faults are retried; a well-formed HTTP error
/// response is never retried. Tests inject zero-delay variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Strategy for resolving a relative media reference against its page URL
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlJoinStrategy {
    /// Join as `{page_url}/{raw}` regardless of the raw value's shape.
    /// Matches the harvested sites this tool grew up on; known to produce
    /// malformed URLs for absolute-path references like `/images/x.jpg`.
    #[default]
    PageJoin,
    /// Standards-based resolution via [`url::Url::join`]
    Rfc3986,
}

/// Main configuration for [`crate::Harvester`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarvesterConfig {
    /// Directory receiving working directories and archives
    /// (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry settings for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Maximum number of candidate years probed per index, the initial
    /// year included (default: 10)
    #[serde(default = "default_max_year_probes")]
    pub max_year_probes: u32,

    /// Relative-URL resolution strategy
    #[serde(default)]
    pub url_join: UrlJoinStrategy,

    /// CSS selector matching media-embedding nodes that carry a source
    /// attribute (default: "img[src]")
    #[serde(default = "default_media_selector")]
    pub media_selector: String,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            max_year_probes: default_max_year_probes(),
            url_join: UrlJoinStrategy::default(),
            media_selector: default_media_selector(),
        }
    }
}

impl HarvesterConfig {
    /// Validate the harvester configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_year_probes < 1 {
            return Err(Error::config(
                "max_year_probes must be at least 1",
                "max_year_probes",
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn default_zero_padding() -> usize {
    1
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_year_probes() -> u32 {
    10
}

fn default_media_selector() -> String {
    "img[src]".to_string()
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
