//! Prometheus metrics.

use crate::config::TaskboardConfig;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

/// Metrics configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Builds metrics configuration from the service configuration.
    #[must_use]
    pub const fn from_config(config: &TaskboardConfig) -> Self {
        Self {
            enabled: config.metrics.enabled,
            listen_addr: config.metrics_addr(),
        }
    }
}

/// Installs the Prometheus recorder.
///
/// With `expose`, also starts the exporter's HTTP listener. Must be called
/// from within a tokio runtime in that case. Returns `None` when metrics
/// are disabled; the `metrics` macros are then no-ops.
pub fn install_prometheus(config: &MetricsConfig, expose: bool) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let builder = PrometheusBuilder::new();
    if expose {
        let recorder = builder
            .with_http_listener(config.listen_addr)
            .build()
            .map_err(|e| Error::operation("metrics_listener_install", e));
        let (recorder, exporter) = recorder?;
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder)
            .map_err(|e| Error::operation("metrics_recorder_install", e))?;
        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::warn!(error = ?e, "Metrics exporter stopped");
            }
        });
        tracing::info!(addr = %config.listen_addr, "Prometheus exporter listening");
        return Ok(Some(handle));
    }

    builder
        .install_recorder()
        .map(Some)
        .map_err(|e| Error::operation("metrics_recorder_install", e))
}
