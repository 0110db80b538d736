//! Observability for Handlr.
//!
//! - **Logging**: `tracing-subscriber` setup, JSON in production and pretty
//!   output in development
//! - **Metrics**: invocation counters and latency histograms via the
//!   `metrics` crate, optionally rendered by an in-process Prometheus
//!   recorder
//!
//! # Example
//!
//! ```rust,ignore
//! use handlr_config::ConfigLoader;
//! use handlr_telemetry::init_telemetry;
//!
//! let config = ConfigLoader::new().with_mode_from_env().load()?;
//! let metrics = init_telemetry(&config.logging)?;
//!
//! // ... later, wherever metrics are exposed:
//! let body = metrics.render();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fmt_layer, init_logging, LogConfig};
pub use metrics::{install_recorder, record_invocation, record_validation_failure, MetricsRegistry};

use handlr_config::LoggingConfig;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and installs the Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem is already initialized or
/// the log filter is invalid.
pub fn init_telemetry(logging: &LoggingConfig) -> TelemetryResult<MetricsRegistry> {
    init_logging(&LogConfig::from(logging))?;
    install_recorder()
}
