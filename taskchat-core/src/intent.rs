//! Intent schema for model replies.
//!
//! The model is asked to answer with a single JSON object:
//!
//! ```json
//! {"action": "add", "task": "Buy milk", "due_date": "2024-01-01", "task_id": ""}
//! ```
//!
//! Its reply is untrusted input. [`parse_intent`] strips an optional markdown
//! code fence, then requires a JSON object whose fields are all strings;
//! absent `task`, `due_date` and `task_id` become `""`. Anything else is an
//! [`ChatError::UpstreamParse`] carrying the untouched reply.
//! [`ChatIntent::into_command`] then checks the action and the fields it
//! needs and produces a typed [`Command`].

use serde::Deserialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::error::ChatError;
use crate::types::TaskId;

/// The five actions a chat message can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Add,
    List,
    Update,
    Complete,
    Delete,
}

/// A parsed but not yet validated model reply.
///
/// Empty string is the only "absent" value; `null` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatIntent {
    pub action: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub task_id: String,
}

/// A validated intent, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { task: String, due_date: String },
    List,
    Update { id: TaskId, task: String, due_date: String },
    Complete { id: TaskId },
    Delete { id: TaskId },
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Command::Add { .. } => Action::Add,
            Command::List => Action::List,
            Command::Update { .. } => Action::Update,
            Command::Complete { .. } => Action::Complete,
            Command::Delete { .. } => Action::Delete,
        }
    }
}

impl ChatIntent {
    /// Check the action and the fields it requires.
    pub fn into_command(self) -> Result<Command, ChatError> {
        let action: Action = self
            .action
            .parse()
            .map_err(|_| ChatError::BadRequest(format!("unknown action '{}'", self.action)))?;

        let task = self.task.trim().to_owned();
        let due_date = self.due_date.trim().to_owned();
        let task_id = self.task_id.trim();

        match action {
            Action::Add => {
                if task.is_empty() {
                    return Err(bad_request("task description required"));
                }
                Ok(Command::Add { task, due_date })
            }
            Action::List => Ok(Command::List),
            Action::Update => {
                if task_id.is_empty() || task.is_empty() {
                    return Err(bad_request("task id and description required"));
                }
                Ok(Command::Update {
                    id: parse_task_id(task_id)?,
                    task,
                    due_date,
                })
            }
            Action::Complete => {
                if task_id.is_empty() {
                    return Err(bad_request("task id required"));
                }
                Ok(Command::Complete {
                    id: parse_task_id(task_id)?,
                })
            }
            Action::Delete => {
                if task_id.is_empty() {
                    return Err(bad_request("task id required"));
                }
                Ok(Command::Delete {
                    id: parse_task_id(task_id)?,
                })
            }
        }
    }
}

/// Parse a raw model reply into a [`ChatIntent`].
pub fn parse_intent(raw: &str) -> Result<ChatIntent, ChatError> {
    let cleaned = strip_code_fence(raw);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| upstream_parse(format!("invalid JSON: {e}"), raw))?;

    // A struct also deserializes from a JSON array, so check the shape first.
    if !value.is_object() {
        return Err(upstream_parse("expected a JSON object", raw));
    }

    serde_json::from_value(value)
        .map_err(|e| upstream_parse(format!("reply does not match the intent schema: {e}"), raw))
}

/// Trim whitespace and remove a surrounding ```` ``` ```` fence, with or
/// without a language tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    let body = match body.split_once('\n') {
        Some((tag, rest)) if !tag.contains('{') => rest,
        _ => body.strip_prefix("json").unwrap_or(body),
    };
    body.trim()
}

fn parse_task_id(raw: &str) -> Result<TaskId, ChatError> {
    // `u64::from_str` alone would accept a leading '+'.
    let digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
    match raw.parse::<TaskId>() {
        Ok(id) if digits && id > 0 => Ok(id),
        _ => Err(ChatError::BadRequest(format!(
            "task id must be a positive integer, got '{raw}'"
        ))),
    }
}

fn bad_request(msg: &str) -> ChatError {
    ChatError::BadRequest(msg.to_owned())
}

fn upstream_parse(reason: impl Into<String>, raw: &str) -> ChatError {
    ChatError::UpstreamParse {
        reason: reason.into(),
        raw: raw.to_owned(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
