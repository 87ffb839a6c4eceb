//! HTTP handlers for chat-service.

pub mod chat;

use crate::services::metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Always 200; reports whether the model is usable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model = if state.orchestrator.is_model_ready() {
        "ready"
    } else {
        "unavailable"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "chat-service",
            "version": env!("CARGO_PKG_VERSION"),
            "model": model
        })),
    )
}

/// Readiness probe. 503 until a model collaborator is available.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.orchestrator.is_model_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

pub async fn metrics() -> impl IntoResponse {
    metrics::get_metrics()
}
