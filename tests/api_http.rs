// tests/api_http.rs
//
// HTTP-level tests for the status Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /status  (subscriber count, seen-set size, source names)
// - CORS header on responses

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use ai_news_tracker::api::{create_router, AppState};
use ai_news_tracker::bot::subscribers::SubscriberRegistry;
use ai_news_tracker::news::aggregator::Aggregator;
use ai_news_tracker::news::classifier::Classifier;
use ai_news_tracker::news::dedup::Deduplicator;
use ai_news_tracker::news::fetcher::FixtureFetcher;
use ai_news_tracker::news::types::FeedSource;
use ai_news_tracker::news::NewsDesk;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state() -> AppState {
    let dedup = Arc::new(Deduplicator::new());
    dedup.admit("https://e.test/already-sent");
    let aggregator = Aggregator::new(
        vec![
            FeedSource::new("alpha", "mem://a"),
            FeedSource::new("beta", "mem://b"),
        ],
        Arc::new(FixtureFetcher::new()),
        Classifier::default(),
        dedup,
    );
    let subscribers = Arc::new(SubscriberRegistry::new());
    subscribers.subscribe(11);
    subscribers.subscribe(22);
    AppState {
        desk: Arc::new(NewsDesk::new(aggregator)),
        subscribers,
    }
}

fn test_router() -> Router {
    create_router(test_state(), None)
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn status_reports_counts_and_sources() {
    let req = Request::builder()
        .method("GET")
        .uri("/status")
        .body(Body::empty())
        .expect("build GET /status");

    let resp = test_router().oneshot(req).await.expect("oneshot /status");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(v["subscribers"], 2);
    assert_eq!(v["seen"], 1);
    assert_eq!(v["sources"], serde_json::json!(["alpha", "beta"]));
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "http://dashboard.test")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert!(resp
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn metrics_route_absent_without_recorder() {
    let req = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .expect("build GET /metrics");

    let resp = test_router().oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
