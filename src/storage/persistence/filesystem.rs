//! JSON file snapshot backend.
//!
//! Stores the whole task index as one pretty-printed JSON document.
//!
//! # Durability
//!
//! Saves never overwrite the document in place. The new content goes to a
//! sibling `<name>.tmp` file, is flushed and synced, and is then renamed over
//! the target. On Unix the parent directory is synced after the rename so
//! the new directory entry survives a crash. A failed or interrupted save
//! leaves the previous document untouched.
//!
//! # Limits
//!
//! Documents larger than [`MAX_DOCUMENT_SIZE`] are refused on load rather
//! than read into memory.

use crate::models::Task;
use crate::storage::document;
use crate::storage::traits::SnapshotBackend;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum document size accepted on load (64 MiB).
pub const MAX_DOCUMENT_SIZE: u64 = 64 * 1024 * 1024;

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    /// Path of the document.
    path: PathBuf,
}

impl JsonFileBackend {
    /// Creates a backend for the document at `path`.
    ///
    /// Nothing touches the filesystem until [`SnapshotBackend::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary path used during saves.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Creates the parent directory and an empty document if absent.
    fn ensure_document(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::LoadFailed {
                path: self.path.display().to_string(),
                cause: format!("cannot create directory {}: {e}", parent.display()),
            })?;
        }

        if self.path.exists() {
            return Ok(());
        }

        tracing::info!(path = %self.path.display(), "Creating empty task document");
        let bytes = document::encode(&[], None)?;
        self.replace_contents(&bytes)
            .map_err(|e| Error::LoadFailed {
                path: self.path.display().to_string(),
                cause: e.to_string(),
            })
    }

    /// Writes `bytes` to the temp file, syncs it, and renames it over the
    /// document.
    fn replace_contents(&self, bytes: &[u8]) -> Result<()> {
        let temp = self.temp_path();

        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .map_err(|e| Error::OperationFailed {
                operation: "write_tasks_file".to_string(),
                cause: format!("{}: {e}", temp.display()),
            });

        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            Error::OperationFailed {
                operation: "replace_tasks_file".to_string(),
                cause: format!("{}: {e}", self.path.display()),
            }
        })?;

        self.sync_parent_dir()
    }

    /// Returns the directory holding the document.
    #[cfg_attr(not(unix), allow(dead_code))]
    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Flushes the directory entry written by the rename.
    #[cfg(unix)]
    fn sync_parent_dir(&self) -> Result<()> {
        let dir = self.parent_dir();
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|e| Error::OperationFailed {
                operation: "sync_tasks_dir".to_string(),
                cause: format!("{}: {e}", dir.display()),
            })
    }

    // Directories cannot be opened as files on other platforms.
    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> Result<()> {
        Ok(())
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Vec<Task>> {
        self.ensure_document()?;

        let origin = self.path.display().to_string();
        let load_failed = |cause: String| Error::LoadFailed {
            path: origin.clone(),
            cause,
        };

        let metadata = fs::metadata(&self.path).map_err(|e| load_failed(e.to_string()))?;
        if metadata.len() > MAX_DOCUMENT_SIZE {
            return Err(load_failed(format!(
                "document is {} bytes, exceeding the maximum of {MAX_DOCUMENT_SIZE} bytes",
                metadata.len()
            )));
        }

        let bytes = fs::read(&self.path).map_err(|e| load_failed(e.to_string()))?;
        document::decode(&bytes, &origin)
    }

    fn save(&mut self, tasks: &[Task], saved_at: DateTime<Utc>) -> Result<()> {
        let bytes = document::encode(tasks, Some(saved_at))?;
        self.replace_contents(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            count = tasks.len(),
            bytes = bytes.len(),
            "Task document written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
