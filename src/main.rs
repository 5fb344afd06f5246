//! Binary entry point for taskboard.
//!
//! Runs the HTTP API or manipulates the task document directly.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::ListFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard::config::TaskboardConfig;
use taskboard::observability::{self, InitOptions};

/// Taskboard - a small task board backed by a JSON document.
#[derive(Parser)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Address to bind (IP address or `localhost`).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind.
        #[arg(short, long)]
        port: Option<u16>,

        /// Task document path.
        #[arg(long)]
        tasks_file: Option<PathBuf>,
    },

    /// List tasks in creation order.
    List {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Add a task.
    Add {
        /// Task title (at least 3 characters).
        title: String,
    },

    /// Mark a task as completed.
    Complete {
        /// Task ID.
        id: String,

        /// Mark the task as not completed instead.
        #[arg(long)]
        undo: bool,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: String,
    },

    /// Show the effective configuration.
    Config,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    let _observability = match observability::init_from_config(
        &config,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: expose_metrics,
        },
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies `serve` flags on top.
fn load_config(cli: &Cli) -> anyhow::Result<TaskboardConfig> {
    let mut config = TaskboardConfig::load(cli.config.as_deref())?;

    if let Commands::Serve {
        host,
        port,
        tasks_file,
    } = &cli.command
    {
        if let Some(host) = host {
            config = config.with_host(host)?;
        }
        if let Some(port) = port {
            config = config.with_port(*port);
        }
        if let Some(tasks_file) = tasks_file {
            config = config.with_tasks_file(tasks_file);
        }
    }

    Ok(config)
}

/// Runs the selected command.
async fn run_command(command: Commands, config: TaskboardConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } => commands::cmd_serve(config).await,
        Commands::List { format } => commands::cmd_list(&config, format),
        Commands::Add { title } => commands::cmd_add(&config, &title),
        Commands::Complete { id, undo } => commands::cmd_complete(&config, &id, !undo),
        Commands::Delete { id } => commands::cmd_delete(&config, &id),
        Commands::Config => {
            commands::cmd_config(&config);
            Ok(())
        },
    }
}
