//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_double_requests_total` (counter): requests by method, status, outcome
//! - `api_double_request_duration_seconds` (histogram): latency by outcome
//!
//! Outcomes are `mock`, `system`, `upstream`, `not_found` and `unauthorized`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "api_double_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome,
    )
    .increment(1);

    ::metrics::histogram!(
        "api_double_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome,
    )
    .record(start.elapsed().as_secs_f64());
}
