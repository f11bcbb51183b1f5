//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a
//! `{"detail": "..."}` JSON body with an appropriate status code.
//!
//! Chat failures are reported in full, including the raw model text for
//! parse failures. Extractor rejections are folded into `BadRequest` so a
//! malformed body or path never produces a plain-text response.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use taskchat_core::{ChatError, StoreError};
use thiserror::Error;
use tracing::{error, warn};

/// All errors that can occur in the taskchat-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the task store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Propagated from the chat pipeline.
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body is larger than the server buffers.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl ServerError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::Store(e @ StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }

            ServerError::Chat(e) => {
                let status = match e {
                    ChatError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    ChatError::NotFound(_) => StatusCode::NOT_FOUND,
                    ChatError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    ChatError::UpstreamParse { .. } | ChatError::UpstreamCall(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    error!(error = %e, "chat request failed");
                } else {
                    warn!(error = %e, "chat request rejected");
                }
                (status, e.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(e: JsonRejection) -> Self {
        ServerError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(e: PathRejection) -> Self {
        ServerError::BadRequest(e.body_text())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
