//! Command handlers module.
//!
//! - `serve.rs`: HTTP API server
//! - `tasks.rs`: direct task document manipulation (list, add, complete, delete)
//! - `config.rs`: configuration display command

mod config;
mod serve;
mod tasks;

use clap::ValueEnum;

pub use config::cmd_config;
pub use serve::cmd_serve;
pub use tasks::{cmd_add, cmd_complete, cmd_delete, cmd_list};

/// Output format for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// One line per task.
    Text,
    /// The task array as pretty JSON.
    Json,
}
