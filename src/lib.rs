// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod metrics;
pub mod page;
pub mod parse;
pub mod registry;
pub mod service;
pub mod signals;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{sentinel_score, Aggregator, EvaluationError, ScoredPage};
pub use crate::api::router;
pub use crate::config::CredibilityConfig;
pub use crate::page::PageData;
pub use crate::service::CredibilityService;

use crate::parse::{HttpPageParser, PageParser, StaticPageParser};

/// Selects the page parser: `http` (default) or `demo`.
pub const ENV_PARSER: &str = "CREDIBILITY_PARSER";

/// The single page served by the demo parser.
pub const DEMO_URL: &str = "https://transit-review.example.com/news/weekend-timetable";

/// In-memory parser holding the bundled demo article at [`DEMO_URL`].
pub fn demo_parser() -> StaticPageParser {
    StaticPageParser::new().with_page(DEMO_URL, include_str!("../demos/article.html"))
}

/// Wire parser and aggregator from configuration. The parser kind comes from
/// `$CREDIBILITY_PARSER`.
pub fn build_service(config: &CredibilityConfig) -> Result<CredibilityService> {
    let kind = std::env::var(ENV_PARSER).unwrap_or_else(|_| "http".to_string());
    let parser: Arc<dyn PageParser> = match kind.trim().to_ascii_lowercase().as_str() {
        "" | "http" => Arc::new(HttpPageParser::new(&config.parser)?),
        "demo" | "static" => Arc::new(demo_parser()),
        other => bail!("{ENV_PARSER} must be `http` or `demo`, got `{other}`"),
    };
    let aggregator = config.aggregator()?;
    info!(
        parser = parser.name(),
        signals = aggregator.registry().len(),
        timeout_ms = config.evaluation.evaluator_timeout_ms,
        "credibility service ready"
    );
    Ok(CredibilityService::new(parser, aggregator))
}

/// Compact `fmt` logs filtered by `RUST_LOG` (default `page_credibility=info,warn`).
/// A no-op when a global subscriber is already installed (e.g. by the Shuttle runtime).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("page_credibility=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
