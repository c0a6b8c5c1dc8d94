//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, route, status
//! - `proxy_request_duration_seconds` (histogram): latency per route
//! - `proxy_stream_records_total` (counter): generation stream records by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed client response.
pub fn record_request(method: &str, route: &'static str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one record read from a generation stream.
pub fn record_stream_record(malformed: bool) {
    let outcome = if malformed { "malformed" } else { "ok" };
    counter!("proxy_stream_records_total", "outcome" => outcome).increment(1);
}
