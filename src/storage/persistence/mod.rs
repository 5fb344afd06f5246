//! Snapshot backend implementations.

mod filesystem;
mod memory;

pub use filesystem::{JsonFileBackend, MAX_DOCUMENT_SIZE};
pub use memory::MemoryBackend;
