//! HTTP gateway (Axum) for keyword-conditioned image verification.
//!
//! This module is primarily used by the `ocular` server binary.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{ClassifyResponse, classify_handler, random_task_handler};
pub use state::HandlerState;

use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, OCULAR_STATUS_ERROR, OCULAR_STATUS_HEADER, OCULAR_STATUS_HEALTHY,
    OCULAR_STATUS_READY,
};
use crate::embedding::LabelScorer;
use crate::taskstore::TaskStore;

/// Builds the service router with the default upload limit.
pub fn create_router_with_state<S, T>(state: HandlerState<S, T>) -> Router
where
    S: LabelScorer,
    T: TaskStore,
{
    create_router_with_limit(state, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Builds the service router with an explicit multipart upload limit.
pub fn create_router_with_limit<S, T>(state: HandlerState<S, T>, max_upload_bytes: usize) -> Router
where
    S: LabelScorer,
    T: TaskStore,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/classify", post(classify_handler))
        .route("/tasks/random", get(random_task_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub model: &'static str,
    pub scorer_mode: &'static str,
    pub task_store: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        OCULAR_STATUS_HEADER,
        HeaderValue::from_static(OCULAR_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<S, T>(State(state): State<HandlerState<S, T>>) -> Response
where
    S: LabelScorer,
    T: TaskStore,
{
    // Stub scorers still serve traffic; /ready only distinguishes the mode.
    let scorer_mode = if state.scorer.is_stub() { "stub" } else { "real" };

    let task_store = if state.task_store.is_some() {
        "configured"
    } else {
        "unconfigured"
    };

    let components = ComponentStatus {
        http: OCULAR_STATUS_READY,
        model: OCULAR_STATUS_READY,
        scorer_mode,
        task_store,
    };

    let is_ready =
        components.http == OCULAR_STATUS_READY && components.model == OCULAR_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        OCULAR_STATUS_HEADER,
        HeaderValue::from_str(status_msg).unwrap_or(HeaderValue::from_static(OCULAR_STATUS_ERROR)),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
