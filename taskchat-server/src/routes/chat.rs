//! Natural-language chat endpoint.
//!
//! The message goes to the upstream model, whose JSON reply is validated and
//! applied to the task store by [`taskchat_core::ChatDispatcher`].

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::extract::JsonBody;
use crate::schemas::chat::{ChatRequest, ChatResponse, ErrorBody};
use crate::state::AppState;

/// Maximum accepted message length in bytes.
const MAX_MESSAGE_BYTES: usize = 8 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ChatResponse, ErrorBody))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Action applied", body = ChatResponse),
        (status = 400, description = "Malformed body, missing field, unknown action or empty message", body = ErrorBody),
        (status = 404, description = "Referenced task does not exist", body = ErrorBody),
        (status = 500, description = "Model call failed or reply was unusable", body = ErrorBody),
        (status = 504, description = "Model call timed out", body = ErrorBody),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if req.message.len() > MAX_MESSAGE_BYTES {
        return Err(ServerError::BadRequest(format!(
            "message too large ({} bytes); maximum is {MAX_MESSAGE_BYTES} bytes",
            req.message.len(),
        )));
    }
    debug!(message_len = req.message.len(), "chat request");

    let response = state.chat.dispatch(&req.message).await?;
    Ok(Json(ChatResponse { response }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
