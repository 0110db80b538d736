//! Invocation metrics.
//!
//! Metrics are recorded through the `metrics` facade, so they are no-ops
//! until a recorder is installed. [`install_recorder`] installs an
//! in-process Prometheus recorder whose output can be rendered on demand.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `handlr_invocations_total` | Counter | `handler`, `status` | Completed invocations |
//! | `handlr_invocation_duration_seconds` | Histogram | `handler` | Invocation latency |
//! | `handlr_validation_failures_total` | Counter | `handler` | Inputs rejected by the schema |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Counter of completed invocations.
pub const INVOCATIONS_TOTAL: &str = "handlr_invocations_total";

/// Histogram of invocation latency.
pub const INVOCATION_DURATION_SECONDS: &str = "handlr_invocation_duration_seconds";

/// Counter of schema rejections.
pub const VALIDATION_FAILURES_TOTAL: &str = "handlr_validation_failures_total";

/// Default buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
pub const DEFAULT_DURATION_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Renders recorded metrics in Prometheus text format.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a Prometheus handle.
    #[must_use]
    pub const fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Returns a Prometheus builder configured with Handlr's histogram buckets.
///
/// # Errors
///
/// Returns `TelemetryError::HistogramBuckets` if the buckets are rejected.
pub fn prometheus_builder() -> TelemetryResult<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(INVOCATION_DURATION_SECONDS.to_string()),
            &DEFAULT_DURATION_BUCKETS,
        )
        .map_err(|e| TelemetryError::HistogramBuckets(e.to_string()))
}

/// Installs the global Prometheus recorder.
///
/// No HTTP listener is started; render the returned registry wherever the
/// application exposes metrics.
///
/// # Errors
///
/// Returns `TelemetryError::RecorderInstalled` if a global recorder is
/// already installed.
pub fn install_recorder() -> TelemetryResult<MetricsRegistry> {
    let handle = prometheus_builder()?
        .install_recorder()
        .map_err(|e| TelemetryError::RecorderInstalled(e.to_string()))?;

    describe_metrics();

    Ok(MetricsRegistry::new(handle))
}

/// Registers descriptions for all standard metrics.
pub fn describe_metrics() {
    describe_counter!(INVOCATIONS_TOTAL, "Total number of handler invocations");
    describe_histogram!(
        INVOCATION_DURATION_SECONDS,
        Unit::Seconds,
        "Handler invocation duration in seconds"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total number of inputs rejected by a handler schema"
    );
}

/// Records a completed invocation.
///
/// Updates:
/// - `handlr_invocations_total` (incremented)
/// - `handlr_invocation_duration_seconds` (histogram observation)
pub fn record_invocation(handler: &str, status: u16, duration: Duration) {
    counter!(
        INVOCATIONS_TOTAL,
        "handler" => handler.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        INVOCATION_DURATION_SECONDS,
        "handler" => handler.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records an input rejected by a handler's schema.
pub fn record_validation_failure(handler: &str) {
    counter!(VALIDATION_FAILURES_TOTAL, "handler" => handler.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_dont_panic() {
        // No recorder installed: the facade drops everything.
        record_invocation("users.get", 200, Duration::from_millis(10));
        record_validation_failure("users.get");
    }

    #[test]
    fn test_local_recorder_renders_invocations() {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let registry = MetricsRegistry::new(recorder.handle());

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            record_invocation("users.get", 200, Duration::from_millis(3));
            record_invocation("users.get", 400, Duration::from_millis(1));
            record_validation_failure("users.get");
        });

        let output = registry.render();
        assert!(output.contains("handlr_invocations_total{handler=\"users.get\",status=\"200\"} 1"));
        assert!(output.contains("handlr_invocations_total{handler=\"users.get\",status=\"400\"} 1"));
        assert!(output.contains("handlr_validation_failures_total{handler=\"users.get\"} 1"));
        assert!(output.contains("handlr_invocation_duration_seconds_bucket"));
    }
}
