//! Media reference extraction and semantic filtering
//!
//! Parses a page body and walks every media-embedding node matched by the
//! configured CSS selector, in document order. References whose source
//! string smells decorative (logo, banner) are flagged excluded by a
//! pluggable predicate; the rest are resolved to absolute URLs with the
//! configured join strategy.

use crate::config::UrlJoinStrategy;
use crate::error::{Error, Result};
use crate::types::MediaReference;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Substrings marking decorative media, matched case-insensitively
const EXCLUDED_MARKERS: &[&str] = &["logo", "banner"];

/// Default semantic filter: excludes sources containing `logo` or `banner`
///
/// A heuristic, not a guarantee. Jobs with other decorations install their
/// own predicate via [`MediaExtractor::with_exclude`].
pub fn default_exclude(raw_url: &str) -> bool {
    let lower = raw_url.to_lowercase();
    EXCLUDED_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Extracts media references from fetched page bodies
pub struct MediaExtractor {
    selector: Selector,
    exclude: Box<dyn Fn(&str) -> bool + Send + Sync>,
    join: UrlJoinStrategy,
}

impl std::fmt::Debug for MediaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaExtractor")
            .field("selector", &self.selector)
            .field("exclude", &"<fn>")
            .field("join", &self.join)
            .finish()
    }
}

impl MediaExtractor {
    /// Build an extractor for the given CSS selector and join strategy
    ///
    /// The selector should match media-embedding nodes carrying a `src`
    /// attribute, e.g. `img[src]` or `img[src], source[src]`.
    pub fn new(media_selector: &str, join: UrlJoinStrategy) -> Result<Self> {
        let selector =
            Selector::parse(media_selector).map_err(|e| Error::Selector(e.to_string()))?;
        Ok(Self {
            selector,
            exclude: Box::new(default_exclude),
            join,
        })
    }

    /// Replace the semantic exclusion predicate
    pub fn with_exclude(
        mut self,
        exclude: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.exclude = Box::new(exclude);
        self
    }

    /// Extract media references from `body` in document order
    ///
    /// Every matched node with a `src` attribute yields one reference;
    /// excluded ones are flagged rather than dropped so callers can report
    /// them.
    pub fn extract(&self, body: &str, page_url: &str) -> Vec<MediaReference> {
        let document = Html::parse_document(body);
        let mut references = Vec::new();
        for element in document.select(&self.selector) {
            let Some(raw_url) = element.value().attr("src") else {
                continue;
            };
            let excluded = (self.exclude)(raw_url);
            let resolved_url = self.resolve_reference(raw_url, page_url);
            references.push(MediaReference {
                raw_url: raw_url.to_string(),
                resolved_url,
                excluded,
            });
        }
        debug!(
            page_url,
            total = references.len(),
            excluded = references.iter().filter(|r| r.excluded).count(),
            "extracted media references"
        );
        references
    }

    /// Resolve a raw reference against the page URL
    fn resolve_reference(&self, raw_url: &str, page_url: &str) -> String {
        if raw_url.starts_with("http://") || raw_url.starts_with("https://") {
            return raw_url.to_string();
        }
        match self.join {
            UrlJoinStrategy::PageJoin => format!("{page_url}/{raw_url}"),
            UrlJoinStrategy::Rfc3986 => match Url::parse(page_url).and_then(|b| b.join(raw_url)) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    debug!(page_url, raw_url, error = %e, "URL join failed, falling back to page join");
                    format!("{page_url}/{raw_url}")
                }
            },
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://example.com/issue-001";

    fn extractor(join: UrlJoinStrategy) -> MediaExtractor {
        MediaExtractor::new("img[src]", join).unwrap()
    }

    #[test]
    fn extracts_references_in_document_order() {
        let body = r#"<html><body>
            <img src="https://cdn.example.com/a.jpg">
            <p>text</p>
            <img src="https://cdn.example.com/b.jpg">
            <img alt="no source">
            <img src="https://cdn.example.com/c.jpg">
        </body></html>"#;

        let refs = extractor(UrlJoinStrategy::PageJoin).extract(body, PAGE_URL);
        let urls: Vec<_> = refs.iter().map(|r| r.raw_url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://cdn.example.com/a.jpg",
                "https://cdn.example.com/b.jpg",
                "https://cdn.example.com/c.jpg",
            ]
        );
    }

    #[test]
    fn flags_logo_and_banner_sources_case_insensitively() {
        let body = r#"<html><body>
            <img src="Site-Logo.png">
            <img src="BANNER_top.jpg">
            <img src="cover.jpg">
        </body></html>"#;

        let refs = extractor(UrlJoinStrategy::PageJoin).extract(body, PAGE_URL);
        assert_eq!(refs.len(), 3);
        assert!(refs[0].excluded, "Site-Logo.png should be excluded");
        assert!(refs[1].excluded, "BANNER_top.jpg should be excluded");
        assert!(!refs[2].excluded, "cover.jpg should be retained");
    }

    #[test]
    fn absolute_references_pass_through_unchanged() {
        let body = r#"<img src="http://cdn.example.com/x.jpg">"#;
        let refs = extractor(UrlJoinStrategy::PageJoin).extract(body, PAGE_URL);
        assert_eq!(refs[0].resolved_url, "http://cdn.example.com/x.jpg");
    }

    #[test]
    fn page_join_appends_raw_value_to_page_url() {
        let body = r#"<img src="images/cover.jpg">"#;
        let refs = extractor(UrlJoinStrategy::PageJoin).extract(body, PAGE_URL);
        assert_eq!(
            refs[0].resolved_url,
            "https://example.com/issue-001/images/cover.jpg"
        );
    }

    #[test]
    fn page_join_keeps_absolute_path_defect() {
        // The naive join doubles the slash for root-relative references;
        // Rfc3986 is the strategy that handles these correctly
        let body = r#"<img src="/images/cover.jpg">"#;
        let refs = extractor(UrlJoinStrategy::PageJoin).extract(body, PAGE_URL);
        assert_eq!(
            refs[0].resolved_url,
            "https://example.com/issue-001//images/cover.jpg"
        );
    }

    #[test]
    fn rfc3986_join_resolves_root_relative_references() {
        let body = r#"<img src="/images/cover.jpg">"#;
        let refs = extractor(UrlJoinStrategy::Rfc3986).extract(body, PAGE_URL);
        assert_eq!(refs[0].resolved_url, "https://example.com/images/cover.jpg");
    }

    #[test]
    fn custom_predicate_replaces_default() {
        let body = r#"<html><body>
            <img src="thumb_small.jpg">
            <img src="logo.png">
        </body></html>"#;

        let refs = extractor(UrlJoinStrategy::PageJoin)
            .with_exclude(|raw| raw.contains("thumb"))
            .extract(body, PAGE_URL);
        assert!(refs[0].excluded, "custom predicate should flag thumbnails");
        assert!(!refs[1].excluded, "custom predicate replaces the default");
    }

    #[test]
    fn selector_list_matches_multiple_node_kinds() {
        let body = r#"<html><body>
            <img src="a.jpg">
            <video><source src="clip.mp4"></video>
        </body></html>"#;

        let extractor =
            MediaExtractor::new("img[src], source[src]", UrlJoinStrategy::PageJoin).unwrap();
        let refs = extractor.extract(body, PAGE_URL);
        let raw: Vec<_> = refs.iter().map(|r| r.raw_url.as_str()).collect();
        assert_eq!(raw, ["a.jpg", "clip.mp4"]);
    }

    #[test]
    fn invalid_selector_is_a_configuration_failure() {
        let err = MediaExtractor::new("img[", UrlJoinStrategy::PageJoin).unwrap_err();
        assert!(matches!(err, Error::Selector(_)));
    }
}
