//! Author attribution.

use anyhow::Result;
use tracing::debug;

use crate::page::PageData;
use crate::telemetry::TelemetrySink;

/// 1 if at least one author looks like a real name, 0 otherwise.
///
/// Byline strings that carry no letters, or are just the site address, do not count.
pub fn evaluate_authors(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let host = page.host();
    let named: Vec<&str> = page
        .authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| is_named_author(a, host.as_deref()))
        .collect();

    debug!(target: "signals", url = %page.url, authors = ?named, "author check");
    telemetry.record(&page.url, "authors_count", named.len() as f64);

    Ok(if named.is_empty() { 0.0 } else { 1.0 })
}

fn is_named_author(author: &str, host: Option<&str>) -> bool {
    let lower = author.to_lowercase();
    author.chars().any(char::is_alphabetic)
        && !lower.contains("www.")
        && !lower.contains("http")
        && host.map_or(true, |h| !lower.contains(h))
}
