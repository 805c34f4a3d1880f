//! Page Credibility Service: Binary Entrypoint
//! Boots the Axum HTTP server: configuration, parser, aggregator, and `/metrics`.

use shuttle_axum::ShuttleAxum;

use page_credibility::api::{self, AppState};
use page_credibility::metrics::Metrics;
use page_credibility::{build_service, init_tracing, CredibilityConfig};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = CredibilityConfig::load()?;
    let service = build_service(&config)?;
    let metrics = Metrics::init(&config.evaluation, service.signal_names().len())?;

    let router = api::router(AppState::new(service)).merge(metrics.router());

    Ok(router.into())
}
