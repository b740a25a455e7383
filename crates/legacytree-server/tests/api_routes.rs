//! Router tests: requests go through the full axum stack via `oneshot`,
//! with offline backends (truncation summaries, a table geocoder, a canned
//! conversation model, no illustration or speech).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use legacytree_chat::{ConversationModel, SessionManager};
use legacytree_core::{LegacyTreeConfig, Result};
use legacytree_enrich::{GeocodeProvider, GeocodingAdapter, Place, StoryEnrichmentPipeline};
use legacytree_infer::{FallbackSummarizer, IllustrationGenerator, NoopSpeech};
use legacytree_server::{build_router, AppState};
use legacytree_store::StoryStore;

struct AtlasProvider;

#[async_trait]
impl GeocodeProvider for AtlasProvider {
    async fn lookup(&self, query: &str) -> Result<Option<Place>> {
        let place = match query.to_lowercase().as_str() {
            "toronto" => Some((43.6532, -79.3832, "Toronto, Ontario, Canada")),
            "mumbai" => Some((19.0760, 72.8777, "Mumbai, Maharashtra, India")),
            "lisbon" => Some((38.7223, -9.1393, "Lisboa, Portugal")),
            _ => None,
        };
        Ok(place.map(|(latitude, longitude, address)| Place {
            latitude,
            longitude,
            address: address.to_string(),
            raw: json!({ "display_name": address }),
        }))
    }

    fn name(&self) -> &str {
        "atlas"
    }
}

struct Interviewer;

#[async_trait]
impl ConversationModel for Interviewer {
    async fn reply(&self, history: &[String]) -> Result<String> {
        Ok(format!("Tell me more ({} turns so far).", history.len()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let config = LegacyTreeConfig::new(dir.path()).unwrap();
    let store = StoryStore::open(&config.data_paths.db).unwrap();
    let pipeline = StoryEnrichmentPipeline::new(
        Arc::new(FallbackSummarizer),
        Arc::new(IllustrationGenerator::unavailable()),
        Arc::new(NoopSpeech),
        Arc::new(GeocodingAdapter::new(Arc::new(AtlasProvider), Duration::ZERO)),
    );
    let chat = SessionManager::new(Arc::new(Interviewer), &config.chat);
    let state = AppState::new(config, store, pipeline, chat);
    (dir, build_router(Arc::new(state)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_status() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summarizer"], "fallback");
    assert_eq!(body["illustration_available"], false);
    assert_eq!(body["speech_available"], false);
    assert_eq!(body["conversation_available"], true);
    assert_eq!(body["geocoder"], "atlas");
}

#[tokio::test]
async fn test_story_lifecycle() {
    let (_dir, app) = test_app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/stories",
        Some(json!({
            "transcript": "My grandfather fought in the war and later we moved to Canada.",
            "location": "Toronto",
            "date": "1950-05-01",
            "message_to_future": "Be brave.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Memories of Grandfather");
    assert_eq!(created["theme"], "war");
    assert_eq!(created["location"], "Toronto");
    assert_eq!(created["lat"], 43.6532);
    assert_eq!(created["date"], "1950-05-01");
    assert_eq!(created["visibility"], "Public");
    assert!(created["illustration_url"].is_null());
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/stories/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/stories/{}", id),
        Some(json!({ "location": "Lisbon", "title": "Grandfather's Crossing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Grandfather's Crossing");
    assert_eq!(updated["lat"], 38.7223);
    assert_eq!(updated["lon"], -9.1393);
    assert_eq!(updated["summary"], created["summary"]);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/stories/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = send(&app, Method::GET, &format!("/api/stories/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/stories/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_draft_is_rejected() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::POST, "/api/stories", Some(json!({ "transcript": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("transcript"));

    let (status, list) = send(&app, Method::GET, "/api/stories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_by_visibility() {
    let (_dir, app) = test_app();
    for (text, visibility) in [
        ("A public memory.", "Public"),
        ("A family secret.", "Private (Family Only)"),
        ("Another public memory.", "public"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/stories",
            Some(json!({ "transcript": text, "visibility": visibility })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, Method::GET, "/api/stories", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, private) = send(&app, Method::GET, "/api/stories?visibility=Private", None).await;
    let private = private.as_array().unwrap();
    assert_eq!(private.len(), 1);
    assert_eq!(private[0]["summary"], "A family secret.");
    assert_eq!(private[0]["location"], "Unknown");
    assert_eq!(private[0]["lat"], 43.6532);

    let (_, public) = send(&app, Method::GET, "/api/stories?visibility=Public", None).await;
    let ids: Vec<i64> = public
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);

    let (status, _) = send(&app, Method::GET, "/api/stories?visibility=friends", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_story_and_geocode() {
    let (_dir, app) = test_app();

    let (status, analysis) = send(
        &app,
        Method::POST,
        "/api/process-story",
        Some(json!({ "text": "Grandma sang at every wedding." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["title"], "Memories of Grandmother");
    assert_eq!(analysis["theme"], "love");
    assert_eq!(analysis["summary"], "Grandma sang at every wedding.");

    let (status, _) = send(&app, Method::POST, "/api/process-story", Some(json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, place) = send(&app, Method::POST, "/api/geocode", Some(json!({ "location": "Mumbai" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(place["resolved"], true);
    assert_eq!(place["address"], "Mumbai, Maharashtra, India");

    let (_, fallback) = send(&app, Method::POST, "/api/geocode", Some(json!({ "location": "Unknown" }))).await;
    assert_eq!(fallback["resolved"], false);
    assert_eq!(fallback["address"], "Toronto, Canada");
    assert_eq!(fallback["longitude"], -79.3832);
}

#[tokio::test]
async fn test_unloaded_backends_answer_503() {
    let (_dir, app) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/illustrations",
        Some(json!({ "text": "A love story", "style": "vintage" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/speech/synthesize", Some(json!({ "text": "Hello" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_conversation_sessions() {
    let (_dir, app) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/conversation",
        Some(json!({ "history": ["You are a guide.", "Hello"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Tell me more (2 turns so far).");

    let (status, _) = send(&app, Method::POST, "/api/conversation", Some(json!({ "history": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, session) = send(&app, Method::POST, "/api/conversation/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = session["id"].as_str().unwrap().to_string();
    let base = format!("/api/conversation/sessions/{}", id);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/messages", base),
        Some(json!({ "message": "I grew up by the sea." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Guide prompt plus the new message.
    assert_eq!(body["response"], "Tell me more (2 turns so far).");
    assert_eq!(body["session"]["turns"].as_array().unwrap().len(), 2);
    assert_eq!(body["session"]["turns"][0]["role"], "user");

    let (_, body) = send(
        &app,
        Method::POST,
        &format!("{}/messages", base),
        Some(json!({ "message": "My father was a fisherman." })),
    )
    .await;
    assert_eq!(body["response"], "Tell me more (4 turns so far).");

    let (status, reset) = send(&app, Method::POST, &format!("{}/reset", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["turns"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_multipart_upload_saves_audio() {
    let (dir, app) = test_app();
    let boundary = "legacytree-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"transcript\"\r\n\r\n\
         We left Mumbai by ship in 1962.\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"location\"\r\n\r\n\
         Mumbai\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"visibility\"\r\n\r\n\
         Private (Family Only)\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"../memo.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\n\
         RIFFDATA\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/stories/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let story: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(story["location"], "Mumbai");
    assert_eq!(story["lat"], 19.076);
    assert_eq!(story["visibility"], "Private");
    let audio_path = story["audio_path"].as_str().unwrap();
    assert!(audio_path.ends_with("_memo.wav"));
    assert!(std::path::Path::new(audio_path).starts_with(dir.path().join("uploads")));
    assert_eq!(std::fs::read(audio_path).unwrap(), b"RIFFDATA");
}

/// `(field, filename, content)` parts as a multipart upload request.
fn multipart_upload(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let boundary = "legacytree-boundary";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{}\r\n", boundary));
        match filename {
            Some(file) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                name, file
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", boundary));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn saved_uploads(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("uploads"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_upload_with_long_image_name_keeps_both_files() {
    let (dir, app) = test_app();
    let long_name = format!("{}.png", "a".repeat(300));
    let request = multipart_upload(
        "/api/stories/upload",
        &[
            ("transcript", None, "Grandma's garden in Lisbon."),
            ("audio", Some("memo.wav"), "RIFFDATA"),
            ("image", Some(long_name.as_str()), "PNGDATA"),
        ],
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let story: Value = serde_json::from_slice(&bytes).unwrap();

    let image_path = story["image_path"].as_str().unwrap();
    assert!(image_path.ends_with("aaa.png"));
    assert_eq!(std::fs::read(image_path).unwrap(), b"PNGDATA");
    assert!(story["audio_path"].as_str().unwrap().ends_with("_memo.wav"));
    assert_eq!(saved_uploads(&dir).len(), 2);
}

#[tokio::test]
async fn test_rejected_upload_leaves_no_files() {
    let (dir, app) = test_app();
    let request = multipart_upload(
        "/api/stories/upload",
        &[
            ("transcript", None, "We sailed from Mumbai."),
            ("language", None, "tlh"),
            ("audio", Some("memo.wav"), "RIFFDATA"),
            ("image", Some("harbour.png"), "PNGDATA"),
        ],
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(saved_uploads(&dir).is_empty());

    let (_, list) = send(&app, Method::GET, "/api/stories", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_speech_languages() {
    let (_dir, app) = test_app();

    let (status, body) = send(&app, Method::GET, "/api/speech/languages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "en");
    assert_eq!(body["languages"].as_object().unwrap().len(), 12);
    assert_eq!(body["languages"]["ja"], "Japanese");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/speech/synthesize",
        Some(json!({ "text": "Hola", "language": "xx" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/speech/synthesize",
        Some(json!({ "text": "Hola", "language": "es", "slow": true })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let request = multipart_upload(
        "/api/speech/transcribe",
        &[("language", None, "xx"), ("audio", Some("memo.wav"), "RIFFDATA")],
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_story_is_not_found() {
    let (_dir, app) = test_app();
    let (status, _) = send(&app, Method::PUT, "/api/stories/999", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
