//! Request and response bodies.

use crate::models::{SaveMeta, Task};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Raw title; validated by the handler.
    pub title: String,
}

/// Body of `PATCH /api/tasks/{id}`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PatchTaskRequest {
    /// New completion state.
    pub completed: bool,
}

/// Response for mutations that return the affected task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    /// The task after the mutation.
    pub task: Task,
    /// Metadata of the save that made it durable.
    pub meta: SaveMeta,
}

/// Response of `GET /api/`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Service banner.
    pub message: &'static str,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthStatus {
    /// Always `true` while the process serves requests.
    pub ok: bool,
}
