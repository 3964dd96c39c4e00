//! # Channel Telemetry
//!
//! Structured logging and Prometheus metrics for the sales-channel pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use channel_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SC_SERVICE_NAME` | `sales-channel` | Service name on log lines |
//! | `SC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SC_JSON_LOGS` | `false` (`true` in containers) | JSON log format |
//! | `SC_NETWORK` | `testnet` | Network label |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, LEDGER_REQUESTS, QUEUE_DEPTH,
    RECONCILIATIONS, SUBMISSIONS, SUBMISSIONS_ENQUEUED, SUBMISSION_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so early log lines can already be counted
    register_metrics()?;
    init_logging(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
