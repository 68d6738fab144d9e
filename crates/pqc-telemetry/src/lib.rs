//! # PQC Telemetry
//!
//! Logging and metrics for the post-quantum gateway.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, plain or JSON output
//! - **Metrics**: a Prometheus registry owned by [`PqcMetrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pqc_telemetry::{init_logging, PqcMetrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! let metrics = PqcMetrics::new()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PQC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `PQC_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `PQC_SERVICE_NAME` | `pqc-gateway` | Service name in the startup line |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{Operation, OperationTimer, Outcome, PqcMetrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric creation or registration failed
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
