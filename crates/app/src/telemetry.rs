//! Tracing and metrics installation for the binary.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::{AppError, Result};

/// Installs the global tracing subscriber described by `config`.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = env_filter(&config.log_level)?;
    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))
}

/// Parses a `RUST_LOG` style directive string.
pub fn env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| AppError::Config {
        key: "RUST_LOG",
        value: directives.to_string(),
        reason: e.to_string(),
    })
}

/// Installs the Prometheus recorder behind the `metrics` macros.
pub fn install_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Telemetry(e.to_string()))
}
