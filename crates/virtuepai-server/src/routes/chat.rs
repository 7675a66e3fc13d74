//! Chat route: `POST /api/chat`.
//!
//! Accepts `{ "message": string }` and always answers a non-empty message
//! with `{ success, reply, error? }`, falling back to a canned reply when the
//! upstream model fails. Only a request that cannot be read, or that has no
//! message at all, is rejected. Whitespace is a message like any other.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::proxy::ChatReply;
use crate::state::AppState;

/// Shown to the user when the request carries no usable message.
const INVALID_REQUEST: &str = "无效的请求，缺少消息内容";

/// Build the `/api/chat` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(chat))
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "unreadable chat request");
        AppError::BadRequest(INVALID_REQUEST.to_owned())
    })?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest(INVALID_REQUEST.to_owned()))?;

    info!(chars = message.chars().count(), "chat request received");

    Ok(Json(state.chat.handle_chat(&message).await))
}
