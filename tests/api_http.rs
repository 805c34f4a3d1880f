// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /signals
// - POST /evaluate (scored page, invalid address, unknown page, bad body)

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use page_credibility::aggregator::{Aggregator, EvaluationSettings};
use page_credibility::api::{self, AppState};
use page_credibility::signals::default_registry;
use page_credibility::{demo_parser, CredibilityService, DEMO_URL};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Same router the binary uses, backed by the in-memory demo parser.
fn test_router() -> Router {
    let aggregator = Aggregator::new(
        default_registry().expect("default registry"),
        EvaluationSettings::default(),
    );
    let service = CredibilityService::new(Arc::new(demo_parser()), aggregator);
    api::router(AppState::new(service))
}

async fn post_evaluate(app: Router, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri("/evaluate")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /evaluate");

    let resp = app.oneshot(req).await.expect("oneshot /evaluate");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse evaluate json");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_signals_lists_registry_in_order() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/signals")
        .body(Body::empty())
        .expect("build GET /signals");

    let resp = app.oneshot(req).await.expect("oneshot /signals");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse signals json");
    let names = v["signals"].as_array().expect("signals array");
    assert_eq!(names.len(), 18);
    assert_eq!(names[0], "authors");
    assert_eq!(names[17], "sentiment_subjectivity");
}

#[tokio::test]
async fn api_evaluate_scores_demo_article() {
    let (status, v) = post_evaluate(test_router(), json!({ "url": DEMO_URL })).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["url"], DEMO_URL);
    assert_eq!(v["outcome"], "ok");
    let score = v["score"].as_f64().expect("numeric score");
    assert!((0.0..=1.0).contains(&score), "score = {score}");
    assert!(v.get("error").is_none(), "no error on success");

    let subs = v["sub_scores"].as_object().expect("sub_scores object");
    assert_eq!(subs.len(), 18);
    assert_eq!(subs.keys().next().map(String::as_str), Some("authors"));
    assert!(v["weights"].is_object());
}

#[tokio::test]
async fn api_evaluate_invalid_address_is_minus_one() {
    let (status, v) = post_evaluate(test_router(), json!({ "url": "ftp://example.org/file" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["score"].as_f64(), Some(-1.0));
    assert_eq!(v["outcome"], "parse_failure");
    assert!(v["error"].as_str().unwrap_or_default().contains("not a valid"));
    assert!(v.get("sub_scores").is_none());
}

#[tokio::test]
async fn api_evaluate_unknown_page_is_minus_one() {
    let (_, v) = post_evaluate(
        test_router(),
        json!({ "url": "https://transit-review.example.com/news/missing" }),
    )
    .await;
    assert_eq!(v["score"].as_f64(), Some(-1.0));
    assert_eq!(v["outcome"], "parse_failure");
}

#[tokio::test]
async fn api_evaluate_rejects_missing_url_field() {
    let app = test_router();
    let req = Request::builder()
        .method("POST")
        .uri("/evaluate")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"link":"https://example.org"}"#))
        .expect("build POST /evaluate");

    let resp = app.oneshot(req).await.expect("oneshot /evaluate");
    assert!(resp.status().is_client_error(), "got {}", resp.status());
}
