//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use taskchat_core::{ChatDispatcher, LanguageModel, MemoryStore};

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The task list. Lost on restart.
    pub store: Arc<MemoryStore>,
    /// Chat pipeline, writing to the same `store`.
    pub chat: Arc<ChatDispatcher>,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn LanguageModel>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let chat = ChatDispatcher::new(model, store.clone()).with_timeout(config.llm_timeout);
        Self {
            config: Arc::new(config),
            store,
            chat: Arc::new(chat),
        }
    }
}
