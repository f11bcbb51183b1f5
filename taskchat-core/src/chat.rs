//! Chat-to-action dispatch.
//!
//! One call to [`ChatDispatcher::dispatch`] walks a single request through
//! model call, reply parsing, intent validation and command application.
//! Every failure is terminal and returned as a [`ChatError`]; nothing is
//! retried. The store is only touched once the command is fully validated,
//! so a failed request never applies part of an action.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::intent::{Command, parse_intent};
use crate::llm::LanguageModel;
use crate::responses;
use crate::store::TaskStore;
use crate::types::{NewTask, STATUS_COMPLETED, TaskPatch};

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Instruction sent with every user message.
pub const SYSTEM_DIRECTIVE: &str = "You are the command parser of a to-do list app. \
Convert the user's message into exactly one JSON object and output ONLY that object: \
no prose, no explanation, no markdown. The object has exactly these string fields:\n\
- \"action\": one of \"add\", \"update\", \"delete\", \"list\", \"complete\"\n\
- \"task\": the task description, or \"\"\n\
- \"due_date\": the due date as YYYY-MM-DD, or \"\"\n\
- \"task_id\": the numeric id of an existing task as a string, or \"\"\n\
Use \"\" for every field the action does not need. Never use null.";

pub struct ChatDispatcher {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn TaskStore>,
    timeout: Duration,
}

impl std::fmt::Debug for ChatDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDispatcher")
            .field("tasks", &self.store.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChatDispatcher {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            model,
            store,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turn `message` into one task action and return its confirmation text.
    pub async fn dispatch(&self, message: &str) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::BadRequest("message must not be empty".into()));
        }
        debug!(message_len = message.len(), "chat message received");

        let raw = tokio::time::timeout(self.timeout, self.model.generate(SYSTEM_DIRECTIVE, message))
            .await
            .map_err(|_| {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "model call timed out");
                ChatError::UpstreamTimeout(self.timeout)
            })?
            .map_err(|e| {
                warn!(error = %e, "model call failed");
                ChatError::UpstreamCall(e)
            })?;
        debug!(raw = %raw, "model reply");

        let intent = parse_intent(&raw).inspect_err(|e| warn!(error = %e, "model reply rejected"))?;
        let command = intent.into_command()?;

        info!(action = %command.action(), "dispatching chat intent");
        self.apply(command)
    }

    fn apply(&self, command: Command) -> Result<String, ChatError> {
        let reply = match command {
            Command::Add { task, due_date } => {
                let created = self
                    .store
                    .create(NewTask::new(task).with_due_date(due_date));
                responses::added(created.id, &created.task, &created.due_date)
            }
            Command::List => responses::listing(&self.store.list()),
            Command::Update { id, task, due_date } => {
                let patch = TaskPatch {
                    task: Some(task),
                    due_date: (!due_date.is_empty()).then(|| due_date.clone()),
                    status: None,
                };
                let updated = self.store.update(id, patch)?;
                responses::updated(id, &updated.task, &due_date)
            }
            Command::Complete { id } => {
                let patch = TaskPatch {
                    status: Some(STATUS_COMPLETED.to_owned()),
                    ..Default::default()
                };
                let done = self.store.update(id, patch)?;
                responses::completed(id, &done.task)
            }
            Command::Delete { id } => {
                let removed = self.store.delete(id)?;
                responses::deleted(id, &removed.task)
            }
        };
        Ok(reply)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use super::*;
    use crate::error::LlmError;
    use crate::store::MemoryStore;

    enum Script {
        Reply(String),
        NoKey,
        Hang,
    }

    /// Answers every call from a fixed script and records the user messages.
    struct ScriptedModel {
        script: Script,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        fn reply(text: &str) -> Arc<Self> {
            Arc::new(Self {
                script: Script::Reply(text.to_owned()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn with(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_owned(), user.to_owned()));
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::NoKey => Err(LlmError::MissingApiKey),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn dispatcher(model: Arc<ScriptedModel>, store: Arc<MemoryStore>) -> ChatDispatcher {
        ChatDispatcher::new(model, store)
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.create(NewTask::new("Buy milk").with_due_date("2024-01-01"));
        store.create(NewTask::new("Call mom"));
        store
    }

    #[tokio::test]
    async fn add_creates_task_and_confirms_with_date() {
        let store = Arc::new(MemoryStore::new());
        let model = ScriptedModel::reply(
            r#"{"action":"add","task":"Buy milk","due_date":"2024-01-01","task_id":""}"#,
        );
        let reply = dispatcher(model.clone(), store.clone())
            .dispatch("remind me to buy milk on new year's day")
            .await
            .expect("add succeeds");

        assert!(reply.contains("Buy milk"), "{reply}");
        assert!(reply.contains("2024-01-01"), "{reply}");

        let tasks = store.list();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task, "Buy milk");
        assert_eq!(tasks[0].status, "Pending");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].0, SYSTEM_DIRECTIVE);
        assert_eq!(seen[0].1, "remind me to buy milk on new year's day");
    }

    #[tokio::test]
    async fn fenced_reply_dispatches_like_plain_reply() {
        let plain = ScriptedModel::reply(r#"{"action":"add","task":"Buy milk","due_date":"2024-01-01"}"#);
        let fenced = ScriptedModel::reply(
            "```json\n{\"action\":\"add\",\"task\":\"Buy milk\",\"due_date\":\"2024-01-01\"}\n```",
        );

        let a = dispatcher(plain, Arc::new(MemoryStore::new()))
            .dispatch("buy milk")
            .await
            .unwrap();
        let b = dispatcher(fenced, Arc::new(MemoryStore::new()))
            .dispatch("buy milk")
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_reply_surfaces_raw_text() {
        let raw = "I think you want to add milk?";
        let store = seeded_store();
        let err = dispatcher(ScriptedModel::reply(raw), store.clone())
            .dispatch("milk")
            .await
            .unwrap_err();

        match &err {
            ChatError::UpstreamParse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("expected UpstreamParse, got {other:?}"),
        }
        assert!(err.to_string().contains(raw));
        assert!(logs_contain("model reply rejected"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_without_id_is_bad_request_and_changes_nothing() {
        let store = seeded_store();
        let before = store.list();
        let err = dispatcher(
            ScriptedModel::reply(r#"{"action":"update","task_id":"","task":"x"}"#),
            store.clone(),
        )
        .dispatch("rename it to x")
        .await
        .unwrap_err();

        assert!(
            matches!(&err, ChatError::BadRequest(m) if m == "task id and description required"),
            "{err:?}"
        );
        assert_eq!(store.list(), before);
    }

    #[tokio::test]
    async fn unknown_action_is_bad_request() {
        let err = dispatcher(
            ScriptedModel::reply(r#"{"action":"frobnicate"}"#),
            seeded_store(),
        )
        .dispatch("do the thing")
        .await
        .unwrap_err();
        assert!(
            matches!(&err, ChatError::BadRequest(m) if m == "unknown action 'frobnicate'"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn update_replaces_description_and_keeps_due_date() {
        let store = seeded_store();
        let reply = dispatcher(
            ScriptedModel::reply(r#"{"action":"update","task_id":"1","task":"Buy oat milk"}"#),
            store.clone(),
        )
        .dispatch("make that oat milk")
        .await
        .unwrap();

        assert_eq!(reply, "Task 1 was updated to 'Buy oat milk'");
        let task = store.get(1).unwrap();
        assert_eq!(task.task, "Buy oat milk");
        assert_eq!(task.due_date, "2024-01-01");
    }

    #[tokio::test]
    async fn complete_marks_task_completed() {
        let store = seeded_store();
        let reply = dispatcher(
            ScriptedModel::reply(r#"{"action":"complete","task_id":"2"}"#),
            store.clone(),
        )
        .dispatch("I called mom")
        .await
        .unwrap();

        assert!(reply.contains("marked complete"), "{reply}");
        assert_eq!(store.get(2).unwrap().status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let store = seeded_store();
        let reply = dispatcher(
            ScriptedModel::reply(r#"{"action":"delete","task_id":"1"}"#),
            store.clone(),
        )
        .dispatch("forget the milk")
        .await
        .unwrap();

        assert_eq!(reply, "Task 1 ('Buy milk') was deleted");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let store = seeded_store();
        let err = dispatcher(
            ScriptedModel::reply(r#"{"action":"delete","task_id":"77"}"#),
            store.clone(),
        )
        .dispatch("delete 77")
        .await
        .unwrap_err();
        assert!(matches!(err, ChatError::NotFound(77)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_renders_store_contents() {
        let reply = dispatcher(ScriptedModel::reply(r#"{"action":"list"}"#), seeded_store())
            .dispatch("what do I have to do?")
            .await
            .unwrap();
        assert!(reply.starts_with("You have 2 tasks:"), "{reply}");
        assert!(reply.contains("Call mom"));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let err = dispatcher(ScriptedModel::with(Script::NoKey), seeded_store())
            .dispatch("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UpstreamCall(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let err = dispatcher(ScriptedModel::with(Script::Hang), seeded_store())
            .with_timeout(Duration::from_millis(20))
            .dispatch("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UpstreamTimeout(d) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn empty_message_never_reaches_the_model() {
        let model = ScriptedModel::reply(r#"{"action":"list"}"#);
        let err = dispatcher(model.clone(), seeded_store())
            .dispatch("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::BadRequest(_)));
        assert!(model.seen.lock().unwrap().is_empty());
    }
}
