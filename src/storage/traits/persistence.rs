//! Snapshot backend trait.

use crate::Result;
use crate::models::Task;
use chrono::{DateTime, Utc};

/// Durable home of the task index.
///
/// A backend only ever sees the whole index: `load` returns every record and
/// `save` replaces everything previously stored. Serialization and the
/// replace step live behind this trait so the store's locking and rollback
/// discipline does not depend on where the bytes go.
pub trait SnapshotBackend: Send {
    /// Prepares the storage location and returns the stored records in
    /// document order.
    ///
    /// Creates an empty document when none exists yet. Each returned task
    /// has passed [`Task::restore`] validation; identifier uniqueness is
    /// checked by the caller.
    fn load(&mut self) -> Result<Vec<Task>>;

    /// Replaces the stored document with `tasks`, stamped `saved_at`.
    ///
    /// On error the previously stored document must still be intact.
    fn save(&mut self, tasks: &[Task], saved_at: DateTime<Utc>) -> Result<()>;

    /// Human-readable location, used in logs and load errors.
    fn describe(&self) -> String;
}
