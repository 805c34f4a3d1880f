use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{extract::State, routing::get, routing::post, Json, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::aggregator::{sentinel_score, ScoreSet};
use crate::service::CredibilityService;

#[derive(Clone)]
pub struct AppState {
    service: Arc<CredibilityService>,
}

impl AppState {
    pub fn new(service: CredibilityService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/signals", get(list_signals))
        .route("/evaluate", post(evaluate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct SignalsResp {
    signals: Vec<String>,
}

async fn list_signals(State(state): State<AppState>) -> Json<SignalsResp> {
    Json(SignalsResp {
        signals: state.service.signal_names(),
    })
}

#[derive(Deserialize)]
struct EvaluateReq {
    url: String,
}

#[derive(Serialize)]
struct EvaluateResp {
    url: String,
    /// Final score in [0, 1], or -1 (parse failure) / -2 (scoring failure).
    score: f64,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_scores: Option<ScoreSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weights: Option<ScoreSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn evaluate(State(state): State<AppState>, Json(body): Json<EvaluateReq>) -> Json<EvaluateResp> {
    let result = state.service.evaluate_url(&body.url).await;
    let score = sentinel_score(&result);
    let resp = match result {
        Ok(page) => EvaluateResp {
            url: page.url,
            score,
            outcome: "ok",
            sub_scores: Some(page.sub_scores),
            weights: Some(page.weights),
            error: None,
        },
        Err(e) => EvaluateResp {
            url: body.url.trim().to_string(),
            score,
            outcome: e.outcome(),
            sub_scores: None,
            weights: None,
            error: Some(e.to_string()),
        },
    };
    info!(target: "api", url = %resp.url, score = resp.score, outcome = resp.outcome, "POST /evaluate");
    Json(resp)
}
