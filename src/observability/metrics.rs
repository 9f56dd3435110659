//! Metrics collection and exposition.
//!
//! # Metrics
//! - `assistant_service_health` (gauge): 2=operational, 1=degraded, 0=unavailable
//! - `assistant_retries_total` (counter): retried endpoint attempts by service
//! - `assistant_fallbacks_total` (counter): answers produced by the simulator after endpoint failure
//! - `assistant_simulated_responses_total` (counter): simulator outputs by intent
//! - `assistant_submissions_total` (counter): chat submissions by outcome
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::HealthStatus;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_service_health(service: &str, status: HealthStatus) {
    let value = match status {
        HealthStatus::Operational => 2.0,
        HealthStatus::Degraded => 1.0,
        HealthStatus::Unavailable => 0.0,
    };
    gauge!("assistant_service_health", "service" => service.to_string()).set(value);
}

pub fn record_retry(service: &str) {
    counter!("assistant_retries_total", "service" => service.to_string()).increment(1);
}

pub fn record_fallback(service: &str) {
    counter!("assistant_fallbacks_total", "service" => service.to_string()).increment(1);
}

pub fn record_simulated_response(intent: &'static str) {
    counter!("assistant_simulated_responses_total", "intent" => intent).increment(1);
}

pub fn record_submission(outcome: &'static str) {
    counter!("assistant_submissions_total", "outcome" => outcome).increment(1);
}
