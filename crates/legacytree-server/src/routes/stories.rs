//! Story routes: create (JSON or multipart), list, get, update, delete.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::ApiResult;
use crate::state::AppState;
use legacytree_core::{Error, Visibility};
use legacytree_enrich::StoryDraft;
use legacytree_store::{Story, StoryUpdate};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stories", post(create_story).get(list_stories))
        .route("/stories/upload", post(upload_story))
        .route(
            "/stories/{id}",
            get(get_story).put(update_story).delete(delete_story),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    visibility: Option<String>,
}

/// POST /api/stories: enrich and store a JSON draft.
async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<StoryDraft>,
) -> ApiResult<(StatusCode, Json<Story>)> {
    let story = state.stories().create(draft).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// GET /api/stories?visibility=Public|Private
async fn list_stories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Story>>> {
    let visibility = params
        .visibility
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::parse::<Visibility>)
        .transpose()?;
    Ok(Json(state.stories().list(visibility)?))
}

/// GET /api/stories/{id}
async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Story>> {
    Ok(Json(state.stories().get(id)?))
}

/// PUT /api/stories/{id}: partial update.
async fn update_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<StoryUpdate>,
) -> ApiResult<Json<Story>> {
    Ok(Json(state.stories().update(id, update).await?))
}

/// DELETE /api/stories/{id}
async fn delete_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.stories().delete(id)?;
    Ok(Json(json!({ "deleted": true, "id": id })))
}

/// An uploaded file held in memory until the draft is known to be valid.
struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

/// POST /api/stories/upload: multipart draft with optional `audio` and `image` files.
async fn upload_story(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Story>)> {
    let mut draft = StoryDraft::default();
    let mut audio: Option<UploadedFile> = None;
    let mut image: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        if name == "audio" || name == "image" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::Validation(format!("Failed to read {}: {}", name, e)))?;
            if bytes.is_empty() {
                continue;
            }
            let file = UploadedFile {
                filename: filename.unwrap_or_else(|| name.clone()),
                bytes: bytes.to_vec(),
            };
            if name == "audio" {
                audio = Some(file);
            } else {
                image = Some(file);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read {}: {}", name, e)))?;
        apply_text_field(&mut draft, &name, value)?;
    }

    if let Some(file) = &audio {
        draft.audio = Some(file.bytes.clone());
    }
    if draft.transcript_text().is_none() && !draft.has_audio() {
        return Err(Error::Validation(
            "Either a transcript or an audio recording is required".into(),
        )
        .into());
    }

    let uploads = &state.config.data_paths.uploads;
    let mut saved = Vec::new();
    let outcome: Result<Story, Error> = async {
        if let Some(file) = audio {
            let path = save_upload(uploads, &file)?;
            draft.audio_path = Some(path.to_string_lossy().to_string());
            saved.push(path);
        }
        if let Some(file) = image {
            let path = save_upload(uploads, &file)?;
            draft.image_path = Some(path.to_string_lossy().to_string());
            saved.push(path);
        }
        state.stories().create(draft).await
    }
    .await;

    match outcome {
        Ok(story) => Ok((StatusCode::CREATED, Json(story))),
        Err(e) => {
            remove_uploads(&saved);
            Err(e.into())
        }
    }
}

fn remove_uploads(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

fn apply_text_field(draft: &mut StoryDraft, name: &str, value: String) -> Result<(), Error> {
    let present = !value.trim().is_empty();
    match name {
        "transcript" => draft.transcript = Some(value),
        "location" if present => draft.location = Some(value),
        "message_to_future" if present => draft.message_to_future = Some(value),
        "style" if present => draft.style = Some(value.trim().to_string()),
        "language" if present => draft.language = Some(value.trim().to_string()),
        "visibility" if present => draft.visibility = value.parse()?,
        "date" if present => {
            let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| Error::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))?;
            draft.date = Some(date);
        }
        "generate_illustration" => {
            draft.generate_illustration =
                matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "on" | "yes");
        }
        _ => {}
    }
    Ok(())
}

/// Write an upload under a unique name. Returns the saved path.
fn save_upload(dir: &std::path::Path, file: &UploadedFile) -> Result<PathBuf, Error> {
    let name = format!("{}_{}", uuid::Uuid::new_v4(), sanitize_filename(&file.filename));
    let path = dir.join(name);
    std::fs::write(&path, &file.bytes)?;
    info!("Saved upload {} ({} bytes)", path.display(), file.bytes.len());
    Ok(path)
}

/// Longest client-supplied name kept after the uuid prefix.
const MAX_FILENAME_BYTES: usize = 100;

/// Sanitize a filename to prevent path traversal.
fn sanitize_filename(name: &str) -> String {
    let name = name.replace(['/', '\\'], "").replace("..", "");
    let name = std::path::Path::new(&name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("unnamed");
    truncate_filename(name, MAX_FILENAME_BYTES)
}

/// Cut a name to `max` bytes, keeping a short extension.
fn truncate_filename(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let extension = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() < 16)
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let mut end = max - extension.len();
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &name[..end], extension)
}
