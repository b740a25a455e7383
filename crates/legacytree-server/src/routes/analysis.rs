//! Text analysis and geocoding pass-through endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::ApiResult;
use crate::state::AppState;
use legacytree_core::Error;
use legacytree_enrich::{GeocodeResult, TextAnalysis};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/process-story", post(process_story))
        .route("/geocode", post(geocode))
}

#[derive(Debug, Deserialize)]
struct ProcessStoryRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeRequest {
    #[serde(default)]
    location: String,
}

/// POST /api/process-story: summary, title and theme for a transcript.
async fn process_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessStoryRequest>,
) -> ApiResult<Json<TextAnalysis>> {
    if req.text.trim().is_empty() {
        return Err(Error::Validation("Text cannot be empty".into()).into());
    }
    Ok(Json(state.pipeline.analyze(&req.text).await))
}

/// POST /api/geocode: always answers, with the default location on failure.
async fn geocode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeocodeRequest>,
) -> Json<GeocodeResult> {
    Json(state.pipeline.geocoder().resolve(&req.location).await)
}
