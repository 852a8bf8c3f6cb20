//! HTTP request handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stash_metrics::{Exposition, StashSource};

use crate::state::ExporterState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
}

/// Handle GET /metrics - Prometheus exposition.
///
/// Always answers 200. Upstream trouble shows up as `stash_up 0` with no
/// content series.
pub async fn metrics<S: StashSource + 'static>(
    State(state): State<Arc<ExporterState<S>>>,
) -> Response {
    let body = state.render_metrics().await;
    ([(header::CONTENT_TYPE, Exposition::content_type())], body).into_response()
}

/// Handle GET /health - liveness of the exporter itself.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
