//! Metrics collection and exposition.
//!
//! # Metrics
//! - `switchyard_requests_total` (counter): dispatches by method, status,
//!   handler
//! - `switchyard_request_duration_seconds` (histogram): dispatch latency by
//!   handler
//!
//! # Design Decisions
//! - Labels use the matched handler id ("none" when no rule matched)
//! - The exporter is optional; recording without it is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(err) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        tracing::error!(error = %err, "failed to install metrics exporter");
    } else {
        tracing::info!(address = %addr, "metrics exporter listening");
    }
}

/// Record one completed dispatch.
pub fn record_dispatch(method: &str, status: u16, handler: &str, start: Instant) {
    metrics::counter!(
        "switchyard_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "handler" => handler.to_string(),
    )
    .increment(1);

    metrics::histogram!(
        "switchyard_request_duration_seconds",
        "handler" => handler.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}
