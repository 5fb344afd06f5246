//! The persisted document format.
//!
//! ```json
//! {
//!   "tasks": [
//!     {
//!       "id": "0b6f...",
//!       "title": "Buy milk",
//!       "completed": false,
//!       "created_at": "2024-05-01T09:30:00.123456Z",
//!       "updated_at": "2024-05-01T09:30:00.123456Z"
//!     }
//!   ],
//!   "saved_at": "2024-05-01T09:30:00.125001Z"
//! }
//! ```
//!
//! Unknown fields are ignored on read. Timestamps without an offset are read
//! as UTC. A record missing `id` gets a fresh identifier, a missing
//! `created_at` is the load time, and a missing `updated_at` equals
//! `created_at`. Saves always write every field.

use crate::models::{RecordRejection, Task, TaskId, timestamp};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serializable task format for the document.
///
/// Timestamps are kept as strings here so a bad value can be reported with
/// the record it belongs to.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<&Task> for StoredTask {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.as_str().to_string()),
            title: task.title.clone(),
            completed: task.completed,
            created_at: Some(timestamp::format(&task.created_at)),
            updated_at: Some(timestamp::format(&task.updated_at)),
        }
    }
}

impl StoredTask {
    fn to_task(&self) -> std::result::Result<Task, String> {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => TaskId::generate().as_str().to_string(),
        };
        let created_at = match &self.created_at {
            Some(raw) => parse_field(&id, "created_at", raw)?,
            None => timestamp::now(),
        };
        let updated_at = match &self.updated_at {
            Some(raw) => parse_field(&id, "updated_at", raw)?,
            None => created_at,
        };
        Task::restore(
            &id,
            &self.title,
            self.completed,
            created_at,
            updated_at,
        )
        .map_err(|rejection: RecordRejection| rejection.to_string())
    }
}

fn parse_field(id: &str, field: &str, raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    timestamp::parse(raw).ok_or_else(|| format!("record '{id}' has an invalid {field}: {raw:?}"))
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    tasks: Vec<StoredTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
}

/// Encodes the full index as a pretty-printed document.
pub fn encode(tasks: &[Task], saved_at: Option<DateTime<Utc>>) -> Result<Vec<u8>> {
    let document = StoredDocument {
        tasks: tasks.iter().map(StoredTask::from).collect(),
        saved_at: saved_at.as_ref().map(timestamp::format),
    };
    let mut bytes =
        serde_json::to_vec_pretty(&document).map_err(|e| Error::operation("serialize_tasks", e))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes a document into validated tasks, in document order.
///
/// Blank input decodes to an empty index. `origin` names the source in the
/// resulting [`Error::LoadFailed`].
pub fn decode(bytes: &[u8], origin: &str) -> Result<Vec<Task>> {
    let load_failed = |cause: String| Error::LoadFailed {
        path: origin.to_string(),
        cause,
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let document: StoredDocument =
        serde_json::from_slice(bytes).map_err(|e| load_failed(e.to_string()))?;

    document
        .tasks
        .iter()
        .map(|stored| stored.to_task().map_err(&load_failed))
        .collect()
}
