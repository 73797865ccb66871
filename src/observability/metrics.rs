//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_relay_requests_total` (counter): `/proxy` requests by method, status
//! - `cors_relay_request_duration_seconds` (histogram): time to response headers
//! - `cors_relay_rejections_total` (counter): pipeline failures by reason
//! - `cors_relay_relay_errors_total` (counter): upstream bodies that failed mid-stream

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ServerError;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(address: &str) -> Result<SocketAddr, ServerError> {
    let addr: SocketAddr = address
        .parse()
        .map_err(|_| ServerError::MetricsAddress(address.to_string()))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(addr)
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "cors_relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("cors_relay_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(reason: &'static str) {
    ::metrics::counter!("cors_relay_rejections_total", "reason" => reason).increment(1);
}

pub fn record_relay_error() {
    ::metrics::counter!("cors_relay_relay_errors_total").increment(1);
}
