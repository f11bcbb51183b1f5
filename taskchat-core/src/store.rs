//! Task storage.
//!
//! [`TaskStore`] is the seam the HTTP handlers and the chat dispatcher talk
//! to. [`MemoryStore`] is the only implementation: an ordered map plus an id
//! counter behind one mutex, so id assignment and list mutation are
//! serialized across concurrent requests. Nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::StoreError;
use crate::types::{NewTask, Task, TaskId, TaskPatch};

/// Operations on the shared task list.
pub trait TaskStore: Send + Sync + 'static {
    /// All tasks in insertion order.
    fn list(&self) -> Vec<Task>;

    fn get(&self, id: TaskId) -> Result<Task, StoreError>;

    /// Store a new task under the next id and return the stored record.
    fn create(&self, new: NewTask) -> Task;

    /// Apply `patch` to the task with `id`. Omitted fields keep their value.
    fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Remove the task with `id` and return it.
    fn delete(&self, id: TaskId) -> Result<Task, StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Inner {
    // Ids only grow, so key order is insertion order.
    tasks: BTreeMap<TaskId, Task>,
    last_id: TaskId,
}

/// In-memory [`TaskStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No operation can panic while holding the guard, so a poisoned lock
        // still holds consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for MemoryStore {
    fn list(&self) -> Vec<Task> {
        self.lock().tasks.values().cloned().collect()
    }

    fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        self.lock()
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn create(&self, new: NewTask) -> Task {
        let mut inner = self.lock();
        inner.last_id += 1;
        let task = Task {
            id: inner.last_id,
            task: new.task,
            due_date: new.due_date,
            status: new.status,
        };
        inner.tasks.insert(task.id, task.clone());
        debug!(id = task.id, "task created");
        task
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut inner = self.lock();
        let task = inner.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(task);
        debug!(id, "task updated");
        Ok(task.clone())
    }

    fn delete(&self, id: TaskId) -> Result<Task, StoreError> {
        let removed = self
            .lock()
            .tasks
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        debug!(id, "task deleted");
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.lock().tasks.len()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
