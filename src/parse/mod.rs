//! Page parsing: fetch a URL and turn its HTML into [`PageData`].
//!
//! The aggregator only depends on the [`PageParser`] trait. `HttpPageParser`
//! fetches over the network; `StaticPageParser` serves HTML from memory and is
//! what tests and the offline demo mode use.

pub mod extract;
pub mod tokenize;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::page::PageData;

pub use extract::page_from_html;

#[async_trait]
pub trait PageParser: Send + Sync {
    /// `None` when the page could not be fetched or yields no usable text.
    async fn parse(&self, url: &str) -> Option<PageData>;
    fn name(&self) -> &'static str;
}

/// True for absolute `http`/`https` URLs with a host.
pub fn valid_address(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Decode leftover HTML entities (double-escaped markup), then collapse runs of
/// whitespace into single spaces and trim.
pub fn clean_text(s: &str) -> String {
    html_escape::decode_html_entities(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `[parser]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("page-credibility/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 15,
        }
    }
}

/// Fetches pages with `reqwest` and extracts them with [`page_from_html`].
#[derive(Clone)]
pub struct HttpPageParser {
    client: reqwest::Client,
}

impl HttpPageParser {
    pub fn new(settings: &ParserSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("page http get()")?
            .error_for_status()
            .context("page http status")?;
        resp.text().await.context("page http .text()")
    }
}

#[async_trait]
impl PageParser for HttpPageParser {
    async fn parse(&self, url: &str) -> Option<PageData> {
        let html = match self.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(target: "parsing", url, error = ?e, "could not fetch page");
                counter!("credibility_fetch_errors_total").increment(1);
                return None;
            }
        };
        debug!(target: "parsing", url, bytes = html.len(), "fetched page");
        page_from_html(url, &html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// In-memory url → html map.
#[derive(Debug, Clone, Default)]
pub struct StaticPageParser {
    pages: HashMap<String, String>,
}

impl StaticPageParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(url.into(), html.into());
    }
}

#[async_trait]
impl PageParser for StaticPageParser {
    async fn parse(&self, url: &str) -> Option<PageData> {
        let Some(html) = self.pages.get(url) else {
            warn!(target: "parsing", url, "no static page registered");
            return None;
        };
        page_from_html(url, html)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
