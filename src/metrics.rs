use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::aggregator::EvaluationSettings;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish static gauges for the
    /// active configuration. Fails if a recorder is already installed.
    pub fn init(settings: &EvaluationSettings, signals: usize) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        gauge!("credibility_signals_registered").set(signals as f64);
        gauge!("credibility_evaluator_timeout_ms").set(settings.evaluator_timeout_ms as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
