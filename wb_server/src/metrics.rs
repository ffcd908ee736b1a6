//! Prometheus metrics for monitoring settlement traffic.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! (configured via `METRICS_BIND`) for scraping by monitoring systems.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter.
///
/// Metrics become available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))
}

/// Record a settlement call with its operation and outcome labels.
///
/// Outcomes are `applied`, `replayed`, or the error code (e.g.
/// `insufficient_funds`).
pub fn settlement_calls_total(operation: &str, outcome: &str) {
    metrics::counter!("settlement_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record settlement call duration in milliseconds.
pub fn settlement_call_duration_ms(operation: &str, duration_ms: f64) {
    metrics::histogram!("settlement_call_duration_ms",
        "operation" => operation.to_string()
    )
    .record(duration_ms);
}

/// Record an operator API call (wallet reads, transfers).
pub fn operator_calls_total(endpoint: &str, status: u16) {
    metrics::counter!("operator_calls_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
