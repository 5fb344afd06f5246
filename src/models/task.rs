//! Task types and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a persisted record was refused when rebuilding the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejection {
    /// The record has a blank `id`.
    #[error("record has an empty id")]
    EmptyId,
    /// The record has a blank `title`.
    #[error("record '{0}' has an empty title")]
    EmptyTitle(TaskId),
    /// `updated_at` precedes `created_at`.
    #[error("record '{0}' was updated before it was created")]
    UpdatedBeforeCreated(TaskId),
    /// Two records share one identifier.
    #[error("duplicate task id '{0}'")]
    DuplicateId(TaskId),
}

/// A tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, fixed at creation.
    pub id: TaskId,
    /// Trimmed title text.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation time. Never changes.
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Time of the latest mutation; equals `created_at` until the first one.
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an incomplete task stamped with `now`.
    ///
    /// `title` is stored as given; validate it with
    /// [`TaskTitle::parse`](super::TaskTitle::parse) first.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a task from persisted fields, checking the record invariants.
    ///
    /// The title is trimmed but not held to the creation-time minimum
    /// length; only blank titles are refused.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordRejection`] naming the first broken invariant.
    pub fn restore(
        id: &str,
        title: &str,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, RecordRejection> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RecordRejection::EmptyId);
        }
        let id = TaskId::new(id);
        let title = title.trim();
        if title.is_empty() {
            return Err(RecordRejection::EmptyTitle(id));
        }
        if updated_at < created_at {
            return Err(RecordRejection::UpdatedBeforeCreated(id));
        }
        Ok(Self {
            id,
            title: title.to_string(),
            completed,
            created_at,
            updated_at,
        })
    }
}
