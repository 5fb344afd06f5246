//! Serve command handler.

use anyhow::Context;
use std::sync::Arc;
use taskboard::config::TaskboardConfig;
use taskboard::{JsonFileBackend, TaskStore, api};

/// Serve command.
///
/// Loads the task document before binding, so a corrupt document stops
/// startup instead of serving an empty board.
pub async fn cmd_serve(config: TaskboardConfig) -> anyhow::Result<()> {
    let path = config.tasks_path();
    let store = TaskStore::open(JsonFileBackend::new(&path))
        .with_context(|| format!("failed to open task store at {}", path.display()))?;

    api::serve(&config, Arc::new(store), shutdown_signal())
        .await
        .context("HTTP server failed")
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
