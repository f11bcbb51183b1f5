use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Free-text instruction, e.g. "remind me to buy milk tomorrow".
    pub message: String,
}

/// Response body for a successfully dispatched chat message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Human-readable confirmation of the action taken.
    pub response: String,
}

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}
