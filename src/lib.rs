//! # Taskboard
//!
//! A small task-tracking service backed by a single JSON document.
//!
//! Tasks live in an in-memory index owned by [`TaskStore`]. Every mutation
//! runs inside one exclusive section and rewrites the whole document before
//! the caller sees the result, so the file and the index never diverge once
//! a save has completed.
//!
//! ## Layers
//!
//! - [`models`]: tasks, identifiers, save metadata, and validation
//! - [`storage`]: the snapshot backend seam and its JSON file implementation
//! - [`services`]: the task store (index, lock, persistence discipline)
//! - [`api`]: axum router translating HTTP requests into store calls
//! - [`config`] and [`observability`]: configuration, logging, metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskboard::TaskStore;
//! use taskboard::storage::JsonFileBackend;
//!
//! # fn main() -> taskboard::Result<()> {
//! let store = TaskStore::open(JsonFileBackend::new("data/tasks.json"))?;
//! let (task, meta) = store.add("Buy milk")?;
//! store.set_completed(&task.id, true)?;
//! assert_eq!(meta.count, store.len()?);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod api;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::TaskboardConfig;
pub use models::{SaveMeta, Task, TaskId, TaskTitle, TitleRejection};
pub use services::TaskStore;
pub use storage::{JsonFileBackend, MemoryBackend, SnapshotBackend};

/// Error type for taskboard operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | A title fails validation, a request body is malformed |
/// | `NotFound` | An id does not name a task in the index |
/// | `LoadFailed` | The persisted document cannot be read, parsed, or validated |
/// | `OperationFailed` | A save fails, a lock is poisoned, a server cannot bind |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised before any store interaction, so it never has side effects.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The persisted document could not be loaded.
    ///
    /// Fatal at startup: the service refuses to run on an empty index when a
    /// document exists but is unreadable.
    #[error("failed to load '{path}': {cause}")]
    LoadFailed {
        /// Where the document was read from.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Writing or replacing the persisted document fails
    /// - Serializing the index fails
    /// - The index lock is poisoned
    /// - The HTTP listener cannot bind or serve
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for taskboard operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("title too short".to_string());
        assert_eq!(err.to_string(), "invalid input: title too short");

        let err = Error::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "task not found: abc");

        let err = Error::LoadFailed {
            path: "data/tasks.json".to_string(),
            cause: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load 'data/tasks.json': expected value"
        );

        let err = Error::operation("write_tasks_file", "disk full");
        assert_eq!(
            err.to_string(),
            "operation 'write_tasks_file' failed: disk full"
        );
    }
}
