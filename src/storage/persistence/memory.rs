//! In-memory snapshot backend.
//!
//! Holds the encoded document as bytes. Handles are cheap clones over shared
//! state, so a caller can hand one to a store and keep another to inspect
//! what was written or to make upcoming saves fail.

use crate::models::Task;
use crate::storage::document;
use crate::storage::traits::SnapshotBackend;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    contents: Option<Vec<u8>>,
    failures_remaining: usize,
    saves: usize,
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Creates an empty backend with no document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-loaded with raw document bytes.
    #[must_use]
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        if let Ok(mut state) = backend.state.lock() {
            state.contents = Some(bytes.into());
        }
        backend
    }

    /// Makes the next `count` saves fail without touching the document.
    pub fn fail_next_saves(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.failures_remaining = count;
        }
    }

    /// Returns a copy of the current document bytes.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.state.lock().ok().and_then(|state| state.contents.clone())
    }

    /// Returns how many saves have succeeded.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.lock().map(|state| state.saves).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| Error::operation("lock_memory_backend", e))
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&mut self) -> Result<Vec<Task>> {
        let mut state = self.lock()?;
        let bytes = match &state.contents {
            Some(bytes) => bytes.clone(),
            None => {
                let empty = document::encode(&[], None)?;
                state.contents = Some(empty.clone());
                empty
            },
        };
        drop(state);
        document::decode(&bytes, "memory")
    }

    fn save(&mut self, tasks: &[Task], saved_at: DateTime<Utc>) -> Result<()> {
        let bytes = document::encode(tasks, Some(saved_at))?;
        let mut state = self.lock()?;
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(Error::operation(
                "write_memory_document",
                "injected save failure",
            ));
        }
        state.contents = Some(bytes);
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
