//! Config command handler.

use taskboard::config::{LogFormat, TaskboardConfig};

/// Config command.
pub fn cmd_config(config: &TaskboardConfig) {
    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Config Files Loaded:");
    if config.config_sources.is_empty() {
        println!("  (none - using defaults)");
    } else {
        for source in &config.config_sources {
            println!("  - {}", source.display());
        }
    }
    println!();

    println!("Storage:");
    println!("  Data Directory: {}", config.data_dir.display());
    println!("  Tasks File: {}", config.tasks_path().display());
    println!();

    println!("HTTP:");
    println!("  Bind Address: {}", config.bind_addr());
    println!("  CORS Origins: {}", config.cors_origins.join(", "));
    println!();

    println!("Observability:");
    display_logging_config(config);
    display_metrics_config(config);
}

/// Helper to display logging configuration.
fn display_logging_config(config: &TaskboardConfig) {
    let format = match config.logging.format {
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };
    println!("  Logging:");
    println!("    Format: {format}");
    println!(
        "    Level: {}",
        config
            .logging
            .level
            .as_deref()
            .unwrap_or("(RUST_LOG or info)")
    );
}

/// Helper to display metrics configuration.
fn display_metrics_config(config: &TaskboardConfig) {
    if config.metrics.enabled {
        println!("  Metrics: enabled");
        println!("    Prometheus Address: {}", config.metrics_addr());
    } else {
        println!("  Metrics: disabled");
    }
}
