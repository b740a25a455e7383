//! Illustration and speech endpoints. Answer 503 when the backend is not loaded.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiResult;
use crate::state::AppState;
use legacytree_core::Error;
use legacytree_infer::{resolve_language, DEFAULT_LANGUAGE, DEFAULT_STYLE, SUPPORTED_LANGUAGES};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/illustrations", post(illustrate))
        .route("/speech/transcribe", post(transcribe))
        .route("/speech/synthesize", post(synthesize))
        .route("/speech/languages", get(languages))
}

#[derive(Debug, Deserialize)]
struct IllustrationRequest {
    text: String,
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SynthesizeRequest {
    text: String,
    language: Option<String>,
    #[serde(default)]
    slow: bool,
}

fn require_text(text: &str) -> Result<(), Error> {
    if text.trim().is_empty() {
        return Err(Error::Validation("Text cannot be empty".into()));
    }
    Ok(())
}

/// POST /api/illustrations
async fn illustrate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IllustrationRequest>,
) -> ApiResult<Json<Value>> {
    require_text(&req.text)?;
    let illustrator = state.pipeline.illustrator();
    if !illustrator.is_available() {
        return Err(Error::Unavailable("Illustration model is not loaded".into()).into());
    }

    let style = req.style.as_deref().unwrap_or(DEFAULT_STYLE);
    let illustration = illustrator
        .generate(&req.text, style)
        .await
        .ok_or_else(|| Error::Unavailable("Illustration generation failed".into()))?;
    Ok(Json(json!({
        "illustration": illustration.data_uri,
        "prompt": illustration.prompt,
    })))
}

/// POST /api/speech/transcribe: multipart with an `audio` file and an
/// optional `language` code.
async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut audio = None;
    let mut language = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("audio") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("Failed to read audio: {}", e)))?;
                audio = Some(bytes);
            }
            Some("language") => {
                let code = field
                    .text()
                    .await
                    .map_err(|e| Error::Validation(format!("Failed to read language: {}", e)))?;
                language = Some(code);
            }
            _ => {}
        }
    }
    let audio = audio
        .filter(|a| !a.is_empty())
        .ok_or_else(|| Error::Validation("An audio file is required".into()))?;
    let language = resolve_language(language.as_deref())?;

    let speech = state.pipeline.speech();
    if !speech.is_available() {
        return Err(Error::Unavailable("Speech model is not loaded".into()).into());
    }
    let text = speech
        .transcribe(&audio, language)
        .await
        .ok_or_else(|| Error::Unavailable("Transcription failed".into()))?;
    Ok(Json(json!({ "text": text, "language": language })))
}

/// POST /api/speech/synthesize
async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> ApiResult<Json<Value>> {
    require_text(&req.text)?;
    let language = resolve_language(req.language.as_deref())?;
    let speech = state.pipeline.speech();
    if !speech.is_available() {
        return Err(Error::Unavailable("Speech model is not loaded".into()).into());
    }

    let audio = speech
        .synthesize(&req.text, language, req.slow)
        .await
        .ok_or_else(|| Error::Unavailable("Speech synthesis failed".into()))?;
    Ok(Json(json!({ "audio": audio })))
}

/// GET /api/speech/languages: codes accepted by both speech endpoints.
async fn languages() -> Json<Value> {
    let languages: serde_json::Map<String, Value> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| (code.to_string(), json!(name)))
        .collect();
    Json(json!({ "default": DEFAULT_LANGUAGE, "languages": languages }))
}
