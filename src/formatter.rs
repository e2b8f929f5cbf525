//! Text transforms turning raw feed fields into display strings.
//!
//! Everything here is pure: no I/O and no shared mutable state.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Medium date + medium time, en-US rendering ("Nov 18, 2024 at 2:53:13 AM")
const MEDIUM_DATE_TIME: &str = "%b %-d, %Y at %-I:%M:%S %p";

const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// Flickr opens every description with "<p><a ...>Name</a> posted a photo:</p>"
static ATTRIBUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*<p>\s*<a\b[^>]*>[^<]*</a>\s*posted an? (?:photo|video):\s*</p>")
        .unwrap_or_else(|e| panic!("invalid attribution pattern: {e}"))
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").unwrap_or_else(|e| panic!("invalid tag pattern: {e}")));

/// Strips HTML markup from a feed description and trims the result.
///
/// The attribution paragraph Flickr prepends is dropped first, so only the
/// photo's own caption survives. Entities are left as-is.
pub fn clean_description(raw: &str) -> String {
    let body = ATTRIBUTION.replace(raw, "");
    TAG.replace_all(&body, "").trim().to_string()
}

/// Returns the contents of the first double-quoted substring.
///
/// `nobody@flickr.com ("David Schenfeld")` yields `David Schenfeld`. Input
/// without a complete quoted substring comes back trimmed but otherwise intact.
pub fn extract_author_name(author: &str) -> String {
    let quoted = author.split_once('"').and_then(|(_, rest)| rest.split_once('"'));
    match quoted {
        Some((name, _)) => name.to_string(),
        None => author.trim().to_string(),
    }
}

/// Reformats a strict UTC timestamp (`2024-11-18T02:53:13Z`) for display.
///
/// Rendering is pinned to en-US and UTC so output does not depend on the host.
pub fn formatted_date(iso: &str) -> Option<String> {
    let naive = NaiveDateTime::parse_from_str(iso, PUBLISHED_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive).format(MEDIUM_DATE_TIME).to_string())
}

/// Reformats a `date_taken` value, keeping the offset it was recorded with.
pub fn formatted_date_taken(iso: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|taken| taken.format(MEDIUM_DATE_TIME).to_string())
}

pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;
