//! Upstream text-generation model.
//!
//! The dispatcher only needs [`LanguageModel::generate`]; tests substitute a
//! scripted implementation. [`GeminiClient`] talks to the Google Generative
//! Language REST API.

mod gemini;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LlmError;

/// A model that turns a system instruction plus a user message into text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// A model visible to the configured API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}
