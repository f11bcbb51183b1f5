use serde::{Deserialize, Serialize};

/// Identifier assigned by the store. Starts at 1 and is never reused.
pub type TaskId = u64;

/// Status given to tasks created without one.
pub const STATUS_PENDING: &str = "Pending";
/// Status set by the chat `complete` action.
pub const STATUS_COMPLETED: &str = "Completed";

/// A stored to-do entry.
///
/// `status` is free-form; `due_date` is an ISO-8601 date or empty and is not
/// validated at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task: String,
    pub due_date: String,
    pub status: String,
}

/// Fields for a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub task: String,
    pub due_date: String,
    pub status: String,
}

impl NewTask {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            due_date: String::new(),
            status: STATUS_PENDING.to_owned(),
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// A partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub task: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.task.is_none() && self.due_date.is_none() && self.status.is_none()
    }

    pub(crate) fn apply(self, target: &mut Task) {
        if let Some(task) = self.task {
            target.task = task;
        }
        if let Some(due_date) = self.due_date {
            target.due_date = due_date;
        }
        if let Some(status) = self.status {
            target.status = status;
        }
    }
}
