//! Structured logging setup.
//!
//! Handlr crates log through `tracing` macros and never install a
//! subscriber themselves. Applications call [`init_logging`] once at
//! startup; the output format follows the runtime mode unless configured
//! otherwise.
//!
//! # Example
//!
//! ```rust,ignore
//! use handlr_config::RuntimeMode;
//! use handlr_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::for_mode(RuntimeMode::from_env()))?;
//!
//! tracing::info!(handler = "users.get", "ready");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use handlr_config::{LogFormat, LoggingConfig, RuntimeMode};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "handlr_runtime=debug,warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }

    /// Returns the preset for a runtime mode.
    #[must_use]
    pub fn for_mode(mode: RuntimeMode) -> Self {
        match mode {
            RuntimeMode::Development => Self::development(),
            RuntimeMode::Production => Self::production(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let json_format = config.format == LogFormat::Json;
        let preset = if json_format {
            Self::production()
        } else {
            Self::development()
        };
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            json_format,
            ..preset
        }
    }
}

/// Initializes the global `tracing` subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad level directive and
/// `TelemetryError::SubscriberInstalled` if a global subscriber is already
/// set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInstalled(e.to_string()))
}

/// Builds the formatting layer for `config`, JSON or pretty.
///
/// The layer carries no filter; [`init_logging`] adds one.
pub fn fmt_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    if config.json_format {
        layer.json().boxed()
    } else {
        layer.pretty().boxed()
    }
}

/// Parses a filter directive such as `"handlr_runtime=debug,info"`.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}
