//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forms_requests_total` (counter): requests by form, status
//! - `forms_request_duration_seconds` (histogram): latency by form
//! - `forms_submissions_total` (counter): delivered submissions by form
//! - `forms_rate_limited_total` (counter): limiter rejections by form
//! - `forms_errors_total` (counter): failures by form, error code
//! - `forms_rate_limit_entries` (gauge): keys held by the limiter store
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(form: &'static str, status: u16, start: Instant) {
    counter!("forms_requests_total", "form" => form, "status" => status.to_string()).increment(1);
    histogram!("forms_request_duration_seconds", "form" => form)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_submission(form: &'static str) {
    counter!("forms_submissions_total", "form" => form).increment(1);
}

pub fn record_rate_limited(form: &'static str) {
    counter!("forms_rate_limited_total", "form" => form).increment(1);
}

pub fn record_error(form: &'static str, code: &'static str) {
    counter!("forms_errors_total", "form" => form, "code" => code).increment(1);
}

pub fn record_limiter_entries(count: usize) {
    gauge!("forms_rate_limit_entries").set(count as f64);
}
