//! Request handlers.
//!
//! Handlers validate input, then hand the store call to the blocking pool:
//! every mutation ends in a synchronous file write.

use super::AppState;
use super::error::ApiError;
use super::types::{CreateTaskRequest, HealthStatus, PatchTaskRequest, ServiceInfo, TaskResponse};
use crate::models::{Task, TaskId, TaskTitle};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// Runs a store call on the blocking pool.
///
/// The spawned task is not cancelled if the client goes away, so a save
/// that has started always finishes.
async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| ApiError::Internal(format!("store task panicked: {e}")))?
        .map_err(ApiError::from)
}

/// `GET /api/`
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Task Board API",
    })
}

/// `GET /api/health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { ok: true })
}

/// `GET /api/tasks`
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let store = state.store;
    let tasks = run_blocking(move || store.list()).await?;
    Ok(Json(tasks))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(request) = payload?;
    let title = TaskTitle::parse(&request.title)?;

    let store = state.store;
    let (task, meta) = run_blocking(move || store.add(title.as_str())).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse { task, meta })))
}

/// `PATCH /api/tasks/{task_id}`
pub async fn patch_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: Result<Json<PatchTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(request) = payload?;
    let id = TaskId::new(task_id);

    let store = state.store;
    let (task, meta) = run_blocking(move || store.set_completed(&id, request.completed)).await?;
    Ok(Json(TaskResponse { task, meta }))
}

/// `DELETE /api/tasks/{task_id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TaskId::new(task_id);

    let store = state.store;
    run_blocking(move || store.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
