//! To-do CRUD endpoints over the in-memory store.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use taskchat_core::{TaskId, TaskStore};
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::extract::{JsonBody, PathParam};
use crate::schemas::chat::ErrorBody;
use crate::schemas::todo::{CreateTodoRequest, TodoResponse, UpdateTodoRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_todos, create_todo, get_todo, update_todo, delete_todo),
    components(schemas(TodoResponse, CreateTodoRequest, UpdateTodoRequest, ErrorBody))
)]
pub struct TodosApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

#[utoipa::path(
    get,
    path = "/todos/",
    tag = "todos",
    responses(
        (status = 200, description = "All todos in creation order", body = [TodoResponse]),
    )
)]
pub async fn list_todos(State(state): State<Arc<AppState>>) -> Json<Vec<TodoResponse>> {
    Json(state.store.list().into_iter().map(TodoResponse::from).collect())
}

#[utoipa::path(
    post,
    path = "/todos/",
    tag = "todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Malformed body or empty task description", body = ErrorBody),
    )
)]
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ServerError> {
    req.validate()?;
    let task = state.store.create(req.into());
    info!(id = task.id, "todo created");
    Ok((StatusCode::CREATED, Json(task.into())))
}

#[utoipa::path(
    get,
    path = "/todos/{id}",
    tag = "todos",
    params(
        ("id" = u64, Path, description = "ID of the todo to retrieve")
    ),
    responses(
        (status = 200, description = "Todo retrieved", body = TodoResponse),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "Todo not found", body = ErrorBody),
    )
)]
pub async fn get_todo(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<TaskId>,
) -> Result<Json<TodoResponse>, ServerError> {
    Ok(Json(state.store.get(id)?.into()))
}

#[utoipa::path(
    put,
    path = "/todos/{id}",
    tag = "todos",
    params(
        ("id" = u64, Path, description = "ID of the todo to update")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Malformed body or empty task description", body = ErrorBody),
        (status = 404, description = "Todo not found", body = ErrorBody),
    )
)]
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<TaskId>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ServerError> {
    req.validate()?;
    let task = state.store.update(id, req.into())?;
    info!(id, "todo updated");
    Ok(Json(task.into()))
}

#[utoipa::path(
    delete,
    path = "/todos/{id}",
    tag = "todos",
    params(
        ("id" = u64, Path, description = "ID of the todo to delete")
    ),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "Todo not found", body = ErrorBody),
    )
)]
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<TaskId>,
) -> Result<StatusCode, ServerError> {
    state.store.delete(id)?;
    info!(id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
