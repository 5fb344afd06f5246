//! The task store.
//!
//! Owns the in-memory index and the snapshot backend behind one mutex. Every
//! operation, reads included, runs inside that exclusive section, and every
//! mutation rewrites the whole document before the section is released.
//!
//! # Failed saves
//!
//! A mutation is applied to the index, then persisted. If the save fails the
//! mutation is undone before the lock is released, so the index always
//! matches the last document that was written successfully and the caller
//! can retry.

use crate::models::{RecordRejection, SaveMeta, Task, TaskId, TitleRejection, timestamp};
use crate::storage::SnapshotBackend;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// A task and its insertion sequence number.
///
/// The sequence breaks `created_at` ties in listings and fixes document
/// order.
#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    seq: u64,
}

#[derive(Debug, Default)]
struct Index {
    entries: HashMap<TaskId, Entry>,
    next_seq: u64,
}

impl Index {
    fn insert(&mut self, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(task.id.clone(), Entry { task, seq });
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if !self.entries.contains_key(&id) {
                return id;
            }
        }
    }

    /// Tasks in insertion order.
    fn in_document_order(&self) -> Vec<Task> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.task.clone()).collect()
    }

    /// Tasks oldest first, ties in insertion order.
    fn in_listing_order(&self) -> Vec<Task> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| (entry.task.created_at, entry.seq));
        entries.into_iter().map(|entry| entry.task.clone()).collect()
    }
}

struct Inner {
    index: Index,
    backend: Box<dyn SnapshotBackend>,
}

impl Inner {
    /// Writes the full index through the backend.
    #[allow(clippy::cast_precision_loss)]
    fn persist(&mut self) -> Result<SaveMeta> {
        let tasks = self.index.in_document_order();
        let saved_at = timestamp::now();
        let started = Instant::now();

        if let Err(e) = self.backend.save(&tasks, saved_at) {
            metrics::counter!("taskboard_store_save_failures_total").increment(1);
            tracing::error!(
                location = %self.backend.describe(),
                error = %e,
                "Failed to persist task index"
            );
            return Err(e);
        }

        metrics::counter!("taskboard_store_saves_total").increment(1);
        metrics::histogram!("taskboard_store_save_duration_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        metrics::gauge!("taskboard_tasks").set(tasks.len() as f64);

        Ok(SaveMeta {
            saved_at,
            count: tasks.len(),
        })
    }
}

/// File-backed task store.
///
/// Share it between request handlers with an `Arc`; all methods take
/// `&self`.
pub struct TaskStore {
    inner: Mutex<Inner>,
    location: String,
}

impl TaskStore {
    /// Opens the store, loading every persisted task into the index.
    ///
    /// The backend creates an empty document when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailed`] if the document cannot be read or
    /// parsed, a record is invalid, or two records share an id. The store
    /// never starts empty over a document it could not read.
    #[allow(clippy::cast_precision_loss)]
    pub fn open(backend: impl SnapshotBackend + 'static) -> Result<Self> {
        let mut backend: Box<dyn SnapshotBackend> = Box::new(backend);
        let location = backend.describe();
        let tasks = backend.load()?;

        let mut index = Index::default();
        for task in tasks {
            if index.entries.contains_key(&task.id) {
                return Err(Error::LoadFailed {
                    path: location,
                    cause: RecordRejection::DuplicateId(task.id).to_string(),
                });
            }
            index.insert(task);
        }

        let count = index.entries.len();
        metrics::gauge!("taskboard_tasks").set(count as f64);
        tracing::info!(location = %location, count, "Task store opened");

        Ok(Self {
            inner: Mutex::new(Inner { index, backend }),
            location,
        })
    }

    /// Returns where the store persists its document.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| Error::operation("lock_task_index", e))
    }

    /// Lists all tasks, oldest first.
    ///
    /// Tasks created in the same microsecond keep their insertion order.
    pub fn list(&self) -> Result<Vec<Task>> {
        Ok(self.lock()?.index.in_listing_order())
    }

    /// Looks up a single task.
    pub fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self
            .lock()?
            .index
            .entries
            .get(id)
            .map(|entry| entry.task.clone()))
    }

    /// Returns the number of tasks.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.index.entries.len())
    }

    /// Returns whether the store holds no tasks.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Adds a task and persists the index.
    ///
    /// The title is trimmed. Length policy belongs to the caller (see
    /// [`TaskTitle::parse`](crate::models::TaskTitle::parse)); the store
    /// only refuses blank titles, which could not be loaded back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank title, or the backend's
    /// error if the save fails (the task is then not added).
    pub fn add(&self, title: &str) -> Result<(Task, SaveMeta)> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput(TitleRejection::Empty.to_string()));
        }

        let mut inner = self.lock()?;
        let id = inner.index.fresh_id();
        let task = Task::new(id.clone(), title, timestamp::now());
        inner.index.insert(task.clone());

        match inner.persist() {
            Ok(meta) => {
                tracing::info!(task_id = %id, count = meta.count, "Task added");
                Ok((task, meta))
            },
            Err(e) => {
                inner.index.entries.remove(&id);
                inner.index.next_seq -= 1;
                tracing::warn!(task_id = %id, "Rolled back task add after failed save");
                Err(e)
            },
        }
    }

    /// Sets a task's completion flag and persists the index.
    ///
    /// `updated_at` advances on every call, even when `completed` already
    /// had the requested value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this id (nothing is
    /// written), or the backend's error if the save fails (the task is then
    /// left as it was).
    pub fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(Task, SaveMeta)> {
        let mut inner = self.lock()?;
        let Some(entry) = inner.index.entries.get_mut(id) else {
            return Err(Error::NotFound(id.to_string()));
        };

        let previous = entry.task.clone();
        entry.task.completed = completed;
        entry.task.updated_at = timestamp::next_after(previous.updated_at);
        let updated = entry.task.clone();

        match inner.persist() {
            Ok(meta) => {
                tracing::info!(task_id = %id, completed, "Task completion updated");
                Ok((updated, meta))
            },
            Err(e) => {
                if let Some(entry) = inner.index.entries.get_mut(id) {
                    entry.task = previous;
                }
                tracing::warn!(task_id = %id, "Rolled back task update after failed save");
                Err(e)
            },
        }
    }

    /// Deletes a task and persists the index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this id (nothing is
    /// written), or the backend's error if the save fails (the task is then
    /// restored).
    pub fn delete(&self, id: &TaskId) -> Result<SaveMeta> {
        let mut inner = self.lock()?;
        let Some(removed) = inner.index.entries.remove(id) else {
            return Err(Error::NotFound(id.to_string()));
        };

        match inner.persist() {
            Ok(meta) => {
                tracing::info!(task_id = %id, count = meta.count, "Task deleted");
                Ok(meta)
            },
            Err(e) => {
                inner.index.entries.insert(id.clone(), removed);
                tracing::warn!(task_id = %id, "Rolled back task delete after failed save");
                Err(e)
            },
        }
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
