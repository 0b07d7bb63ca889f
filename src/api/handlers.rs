//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ErrorResponse, PostMessageRequest, PostMessageResponse};
use super::AppState;
use crate::game::SessionView;
use crate::router::InboundMessage;
use crate::runtime::RuntimeError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inbound chat messages
        .route("/api/chats/:chat_id/messages", post(post_message))
        // SSE streaming of replies
        .route("/api/chats/:chat_id/stream", get(stream_chat))
        // Active round snapshot
        .route("/api/chats/:chat_id/session", get(get_session))
        .with_state(state)
}

// ============================================================
// Messages
// ============================================================

async fn post_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<PostMessageResponse>), AppError> {
    let forwarded = state
        .runtime
        .dispatch(InboundMessage {
            chat_id,
            sender_name: req.sender_name,
            body: req.body,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(PostMessageResponse { forwarded })))
}

// ============================================================
// Streaming
// ============================================================

async fn stream_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> impl IntoResponse {
    // Subscribe before the snapshot so no reply falls between them
    let broadcast_rx = state.runtime.subscribe(&chat_id).await;
    let session = state.runtime.session_view(&chat_id);
    sse_stream(chat_id, session, broadcast_rx)
}

// ============================================================
// Session
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    state
        .runtime
        .session_view(&chat_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No active round in chat {chat_id}")))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
