//! Health and backend availability.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;
use legacytree_core::BackendStatus;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/status: which optional backends are loaded.
async fn status(State(state): State<Arc<AppState>>) -> Json<BackendStatus> {
    Json(state.status())
}
