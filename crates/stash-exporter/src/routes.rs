//! Route configuration for the exporter.

use std::sync::Arc;

use axum::routing::{get, Router};
use stash_metrics::StashSource;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, metrics};
use crate::state::ExporterState;

/// Create the exporter router.
pub fn create_router<S: StashSource + 'static>(state: Arc<ExporterState<S>>) -> Router {
    Router::new()
        .route("/metrics", get(metrics::<S>))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
