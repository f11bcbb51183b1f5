//! taskchat-core – task store and chat dispatch.
//!
//! The crate has two entry points that the server wires together:
//!
//! - [`store::MemoryStore`], an in-memory ordered task list behind the
//!   [`store::TaskStore`] trait, used directly by the CRUD routes.
//! - [`chat::ChatDispatcher`], which sends free text to a
//!   [`llm::LanguageModel`], validates the reply against the intent schema in
//!   [`intent`], and applies the resulting command to the same store.

pub mod chat;
pub mod error;
pub mod intent;
pub mod llm;
pub mod responses;
pub mod store;
pub mod types;

pub use chat::ChatDispatcher;
pub use error::{ChatError, LlmError, StoreError};
pub use intent::{Action, ChatIntent, Command};
pub use llm::{GeminiClient, LanguageModel, ModelInfo};
pub use store::{MemoryStore, TaskStore};
pub use types::{NewTask, Task, TaskId, TaskPatch};
