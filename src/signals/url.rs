//! Domain ending of the page URL.

use anyhow::Result;

use crate::page::PageData;
use crate::telemetry::TelemetrySink;

const TRUSTED_ENDINGS: [&str; 3] = ["gov", "org", "edu"];

/// 1 for `.gov`, `.org` or `.edu` hosts, 0 otherwise (including pages without a host).
pub fn evaluate_domain_ending(page: &PageData, _telemetry: &dyn TelemetrySink) -> Result<f64> {
    let trusted = page
        .host()
        .and_then(|h| h.rsplit('.').next().map(str::to_string))
        .map_or(false, |ending| TRUSTED_ENDINGS.iter().any(|t| ending.contains(t)));
    Ok(if trusted { 1.0 } else { 0.0 })
}
