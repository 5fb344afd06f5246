//! Business logic services.
//!
//! Services own the in-memory state and drive the storage backends.

mod task_store;

pub use task_store::TaskStore;
