//! Telemetry error types.

use thiserror::Error;

/// Errors raised while wiring up logging or metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// The directive as configured.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// Another global `tracing` subscriber owns the process.
    #[error("a global tracing subscriber is already installed: {0}")]
    SubscriberInstalled(String),

    /// Another global metrics recorder owns the process.
    #[error("a global metrics recorder is already installed: {0}")]
    RecorderInstalled(String),

    /// The latency histogram buckets were rejected by the exporter.
    #[error("invalid histogram buckets: {0}")]
    HistogramBuckets(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_names_directive() {
        let err = TelemetryError::InvalidFilter {
            directive: "handlr=loud".to_string(),
            reason: "unknown level".to_string(),
        };
        assert_eq!(err.to_string(), "invalid log filter `handlr=loud`: unknown level");
    }

    #[test]
    fn test_already_installed_messages() {
        let err = TelemetryError::SubscriberInstalled("registry".to_string());
        assert!(err.to_string().starts_with("a global tracing subscriber"));
        let err = TelemetryError::RecorderInstalled("prometheus".to_string());
        assert!(err.to_string().starts_with("a global metrics recorder"));
    }
}
