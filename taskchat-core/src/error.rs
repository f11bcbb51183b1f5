//! Error types for the store, the upstream model client and the chat pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::types::TaskId;

/// Errors returned by [`crate::store::TaskStore`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No task with this id exists.
    #[error("Todo {0} not found")]
    NotFound(TaskId),
}

/// Errors from calling the upstream text-generation model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured.
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    /// The configured endpoint is not a valid URL.
    #[error("invalid model endpoint URL {0}")]
    InvalidUrl(String),

    /// The HTTP request failed (connect, TLS, body decode, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-2xx status.
    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply carried no text part.
    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Terminal failure states of a single chat request.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A required intent field is missing, the action is unknown, or the
    /// caller sent an unusable message.
    #[error("{0}")]
    BadRequest(String),

    /// The intent named a task that does not exist.
    #[error("Todo {0} not found")]
    NotFound(TaskId),

    /// The model reply is not JSON or does not match the intent schema.
    /// `raw` is the reply exactly as received.
    #[error("could not parse model response ({reason}); raw response: {raw}")]
    UpstreamParse { reason: String, raw: String },

    /// Calling the model failed.
    #[error("model call failed: {0}")]
    UpstreamCall(#[source] LlmError),

    /// The model did not answer within the configured bound.
    #[error("model call timed out after {}s", .0.as_secs_f32())]
    UpstreamTimeout(Duration),
}

impl From<StoreError> for ChatError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ChatError::NotFound(id),
        }
    }
}

impl From<LlmError> for ChatError {
    fn from(e: LlmError) -> Self {
        ChatError::UpstreamCall(e)
    }
}
