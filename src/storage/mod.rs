//! Storage layer abstraction.
//!
//! The task index is persisted as a single document that is replaced whole
//! on every save:
//! - [`document`]: encoding and decoding of the JSON document
//! - [`SnapshotBackend`]: where the document lives
//! - [`JsonFileBackend`]: a file on disk, replaced atomically
//! - [`MemoryBackend`]: bytes in memory, with save-failure injection

pub mod document;
pub mod persistence;
pub mod traits;

pub use persistence::{JsonFileBackend, MAX_DOCUMENT_SIZE, MemoryBackend};
pub use traits::SnapshotBackend;
