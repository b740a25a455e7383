//! Guided interview routes: stateless exchange plus explicit sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::ApiResult;
use crate::state::AppState;
use legacytree_chat::{
    ConversationRequest, ConversationResponse, ConversationSession, SessionMessageRequest,
    SessionMessageResponse,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/conversation", post(converse))
        .route(
            "/conversation/sessions",
            post(create_session).get(list_sessions),
        )
        .route(
            "/conversation/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/conversation/sessions/{id}/messages", post(send_message))
        .route("/conversation/sessions/{id}/reset", post(reset_session))
}

/// POST /api/conversation: reply to a caller-held history.
async fn converse(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversationRequest>,
) -> ApiResult<Json<ConversationResponse>> {
    let response = state.chat.reply(&req.history).await?;
    Ok(Json(ConversationResponse { response }))
}

/// POST /api/conversation/sessions
async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ConversationSession>) {
    (StatusCode::CREATED, Json(state.chat.create()))
}

/// GET /api/conversation/sessions
async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<ConversationSession>> {
    Json(state.chat.list())
}

/// GET /api/conversation/sessions/{id}
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationSession>> {
    Ok(Json(state.chat.get(&id)?))
}

/// POST /api/conversation/sessions/{id}/messages
async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SessionMessageRequest>,
) -> ApiResult<Json<SessionMessageResponse>> {
    let (response, session) = state.chat.converse(&id, &req.message).await?;
    Ok(Json(SessionMessageResponse { response, session }))
}

/// POST /api/conversation/sessions/{id}/reset
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationSession>> {
    Ok(Json(state.chat.reset(&id)?))
}

/// DELETE /api/conversation/sessions/{id}
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.chat.delete(&id)?;
    Ok(Json(json!({ "deleted": true, "id": id })))
}
