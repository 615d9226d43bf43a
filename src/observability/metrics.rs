//! Metrics collection and exposition.
//!
//! # Metrics
//! - `counter_requests_total` (counter): requests by operation, status
//! - `counter_request_duration_seconds` (histogram): latency by operation
//! - `counter_hits_total` (counter): recorded hits, labelled by whether they counted as unique
//! - `counter_store_calls_total` (counter): store calls by op, outcome
//! - `counter_store_conflicts_total` (counter): lost compare-and-swap rounds
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(operation: &'static str, status: u16, start: Instant) {
    counter!(
        "counter_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("counter_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_hit(counted_unique: bool) {
    counter!("counter_hits_total", "unique" => if counted_unique { "true" } else { "false" })
        .increment(1);
}

pub fn record_store_call(op: &'static str, outcome: &'static str) {
    counter!("counter_store_calls_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_store_conflict() {
    counter!("counter_store_conflicts_total").increment(1);
}
