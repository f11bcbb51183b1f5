//! Confirmation text for each chat action.
//!
//! These are pure formatters; the dispatcher calls them after the store
//! operation succeeded.

use std::fmt::Write as _;

use crate::types::{Task, TaskId};

pub fn added(id: TaskId, task: &str, due_date: &str) -> String {
    format!("'{task}' was added as task {id}{}", due_clause(due_date))
}

pub fn updated(id: TaskId, task: &str, due_date: &str) -> String {
    format!("Task {id} was updated to '{task}'{}", due_clause(due_date))
}

pub fn completed(id: TaskId, task: &str) -> String {
    format!("Task {id} ('{task}') is marked complete")
}

pub fn deleted(id: TaskId, task: &str) -> String {
    format!("Task {id} ('{task}') was deleted")
}

/// One line per task, in store order.
pub fn listing(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "You have no tasks.".to_owned();
    }

    let noun = if tasks.len() == 1 { "task" } else { "tasks" };
    let mut out = format!("You have {} {noun}:", tasks.len());
    for t in tasks {
        let _ = write!(out, "\n{}. {} [{}]", t.id, t.task, t.status);
        if !t.due_date.is_empty() {
            let _ = write!(out, " (due {})", t.due_date);
        }
    }
    out
}

fn due_clause(due_date: &str) -> String {
    if due_date.is_empty() {
        String::new()
    } else {
        format!(", due {due_date}")
    }
}
