//! Save metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a completed save.
///
/// Returned to callers after every successful mutation; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMeta {
    /// When the document was written.
    #[serde(with = "super::timestamp")]
    pub saved_at: DateTime<Utc>,
    /// Number of tasks in the index after the operation.
    pub count: usize,
}
