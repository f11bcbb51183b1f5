use serde::{Deserialize, Serialize};
use taskchat_core::{NewTask, Task, TaskPatch};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub id: u64,
    pub task: String,
    pub due_date: String,
    pub status: String,
}

impl From<Task> for TodoResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            task: t.task,
            due_date: t.due_date,
            status: t.status,
        }
    }
}

/// Body of `POST /todos/`. `due_date` defaults to empty, `status` to `Pending`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    #[validate(custom(function = "not_blank"))]
    pub task: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CreateTodoRequest> for NewTask {
    fn from(req: CreateTodoRequest) -> Self {
        let mut new = NewTask::new(req.task.trim());
        if let Some(due) = req.due_date {
            new = new.with_due_date(due);
        }
        if let Some(status) = req.status.filter(|s| !s.trim().is_empty()) {
            new = new.with_status(status);
        }
        new
    }
}

/// Body of `PUT /todos/{id}`. Omitted fields keep their stored value; an
/// `id` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoRequest {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<UpdateTodoRequest> for TaskPatch {
    fn from(req: UpdateTodoRequest) -> Self {
        TaskPatch {
            task: req.task.map(|t| t.trim().to_owned()),
            due_date: req.due_date,
            status: req.status,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("task must not be empty".into()));
    }
    Ok(())
}
