//! Metrics collection and exposition.
//!
//! # Metrics
//! - `total_requests` (counter): every proxied request
//! - `endpoint_requests_total` (counter): requests per backend
//! - `proxy_requests_total` (counter): requests by method and status
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `total_endpoints` (gauge): size of the active backend set
//! - `config_reloads_total` (counter): reload attempts by outcome
//!
//! # Design Decisions
//! - Components receive an `Arc<dyn MetricsSink>` instead of touching
//!   process-wide state directly
//! - `PrometheusSink` forwards to the `metrics` facade; the exporter is
//!   installed separately by `init_metrics`

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Destination for proxy measurements.
pub trait MetricsSink: Send + Sync {
    /// A request finished with `status`; `backend` is empty if none was chosen.
    fn record_request(&self, method: &str, status: u16, backend: &str, start: Instant);

    /// A reload attempt finished.
    fn record_reload(&self, success: bool);

    /// The active backend set now has `count` entries.
    fn set_backend_count(&self, count: usize);
}

/// Sink backed by the `metrics` crate facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_request(&self, method: &str, status: u16, backend: &str, start: Instant) {
        let status = status.to_string();
        counter!("total_requests").increment(1);
        counter!(
            "proxy_requests_total",
            "method" => method.to_string(),
            "status" => status.clone()
        )
        .increment(1);
        histogram!(
            "proxy_request_duration_seconds",
            "method" => method.to_string(),
            "status" => status
        )
        .record(start.elapsed().as_secs_f64());

        if !backend.is_empty() {
            counter!("endpoint_requests_total", "endpoint" => backend.to_string()).increment(1);
        }
    }

    fn record_reload(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        counter!("config_reloads_total", "outcome" => outcome).increment(1);
    }

    fn set_backend_count(&self, count: usize) {
        gauge!("total_endpoints").set(count as f64);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_request(&self, _method: &str, _status: u16, _backend: &str, _start: Instant) {}
    fn record_reload(&self, _success: bool) {}
    fn set_backend_count(&self, _count: usize) {}
}

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter"),
    }
}
