//! Structured logging configuration.

use crate::config::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// Filter used when nothing else is configured.
const DEFAULT_FILTER: &str = "info";

/// Filter used with `--verbose`.
const VERBOSE_FILTER: &str = "debug";

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    pub directives: String,
    /// Output format.
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Resolves logging configuration.
    ///
    /// Precedence: `--verbose`, then the configured level (which already
    /// includes `TASKBOARD_LOG`), then `RUST_LOG`, then `info`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        Self::resolve(settings, verbose, std::env::var("RUST_LOG").ok())
    }

    fn resolve(settings: &LoggingSettings, verbose: bool, rust_log: Option<String>) -> Self {
        let directives = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            settings
                .level
                .clone()
                .or(rust_log)
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };

        Self {
            directives,
            format: settings.format,
        }
    }

    /// Builds the `EnvFilter`, falling back to `info` on bad directives.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
