//! Outbound (external) links cited in the article body.

use std::collections::BTreeMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::page::{host_of, PageData};
use crate::parse::{clean_text, valid_address};
use crate::telemetry::TelemetrySink;

/// External links needed for the best score.
pub const LINKS_EXTERNAL_THRESHOLD: f64 = 3.0;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Two hosts belong to the same site if equal or one is a subdomain of the other.
fn same_site(a: &str, b: &str) -> bool {
    a == b || a.ends_with(&format!(".{b}")) || b.ends_with(&format!(".{a}"))
}

/// `(href, anchor text)` for every distinct absolute link whose anchor text is
/// non-empty, points off-site, and appears verbatim in the body text.
pub fn external_links(page: &PageData) -> BTreeMap<String, String> {
    let local = page.host();
    let mut links = BTreeMap::new();

    let doc = Html::parse_document(&page.html);
    for anchor in doc.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let text = clean_text(&anchor.text().collect::<String>());
        if text.is_empty() || links.contains_key(href) || !valid_address(href) {
            continue;
        }
        let Some(link_host) = host_of(href) else {
            continue;
        };
        let external = local.as_deref().map_or(true, |l| !same_site(l, &link_host));
        if external && page.text.contains(&text) {
            links.insert(href.to_string(), text);
        }
    }
    links
}

/// `min(n / 3, 1)` for `n` external links.
pub fn evaluate_links_external(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let links = external_links(page);
    info!(target: "signals", url = %page.url, count = links.len(), "external links");
    debug!(target: "signals", url = %page.url, links = ?links, "external link targets");
    telemetry.record(&page.url, "links_count", links.len() as f64);

    Ok((links.len() as f64 / LINKS_EXTERNAL_THRESHOLD).min(1.0))
}
