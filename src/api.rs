// src/api.rs
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::bot::subscribers::SubscriberRegistry;
use crate::metrics::Metrics;
use crate::news::NewsDesk;

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<NewsDesk>,
    pub subscribers: Arc<SubscriberRegistry>,
}

#[derive(Debug, Serialize)]
pub struct StatusResp {
    pub subscribers: usize,
    pub seen: usize,
    pub sources: Vec<String>,
}

/// Status surface: `/health`, `/status`, and `/metrics` when a recorder is given.
pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(status))
        .with_state(state);

    let router = match metrics {
        Some(m) => router.merge(m.router()),
        None => router,
    };
    router.layer(CorsLayer::very_permissive())
}

async fn status(State(state): State<AppState>) -> Json<StatusResp> {
    Json(StatusResp {
        subscribers: state.subscribers.len(),
        seen: state.desk.dedup().len(),
        sources: state.desk.source_names(),
    })
}
