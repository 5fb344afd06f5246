//! Data models for taskboard.
//!
//! Tasks, their identifiers and titles, save metadata, and the timestamp
//! helpers every layer agrees on.

mod meta;
mod task;
pub mod timestamp;
mod title;

pub use meta::SaveMeta;
pub use task::{RecordRejection, Task, TaskId};
pub use title::{MIN_TITLE_CHARS, TaskTitle, TitleRejection};
