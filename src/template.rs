//! URL and name template resolution
//!
//! Templates carry two placeholders: `{n}` for the zero-padded range index
//! and `{year}` for year-qualified series. Resolution is pure and total:
//! when no year is supplied, the year token is removed together with its
//! leading `-` separator so no dangling artifact survives. Whether a
//! year-less job may carry a `{year}` token at all is decided once, at job
//! construction (see [`crate::config::JobConfig::validate`]), not here.

/// Index placeholder token
pub const INDEX_TOKEN: &str = "{n}";
/// Year placeholder token
pub const YEAR_TOKEN: &str = "{year}";

/// Year token with its leading separator, removed as a unit when no year
/// is supplied
const YEAR_TOKEN_WITH_SEPARATOR: &str = "-{year}";

/// Render `n` as a decimal string left-padded with zeros to `width` digits
///
/// A width of 1 means no padding. Numbers wider than `width` are never
/// truncated.
pub fn pad_index(n: u32, width: usize) -> String {
    format!("{n:0width$}")
}

/// Substitute `{n}` and `{year}` into `template`
///
/// With `year` absent, `-{year}` is removed before `{year}` so templates
/// like `issue-{n}-{year}` resolve to `issue-001` rather than `issue-001-`.
pub fn resolve(template: &str, n: u32, zero_padding: usize, year: Option<i32>) -> String {
    let mut resolved = template.replace(INDEX_TOKEN, &pad_index(n, zero_padding));
    match year {
        Some(year) => resolved = resolved.replace(YEAR_TOKEN, &year.to_string()),
        None => {
            resolved = resolved.replace(YEAR_TOKEN_WITH_SEPARATOR, "");
            resolved = resolved.replace(YEAR_TOKEN, "");
        }
    }
    resolved
}

/// True when `template` contains the `{n}` placeholder
pub fn has_index_token(template: &str) -> bool {
    template.contains(INDEX_TOKEN)
}

/// True when `template` contains the `{year}` placeholder
pub fn has_year_token(template: &str) -> bool {
    template.contains(YEAR_TOKEN)
}
