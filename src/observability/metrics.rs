//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lbsync_cycles_total` (counter): cycles by outcome (unchanged, applied, failed)
//! - `lbsync_cycle_errors_total` (counter): failed cycles by step (fetch, render, apply)
//! - `lbsync_backends` (gauge): size of the last fetched backend set
//! - `lbsync_process_launches_total` (counter): child processes spawned
//! - `lbsync_process_reloads_total` (counter): reload signals delivered

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_cycle(outcome: &'static str) {
    metrics::counter!("lbsync_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_cycle_error(step: &'static str) {
    metrics::counter!("lbsync_cycle_errors_total", "step" => step).increment(1);
}

pub fn record_backends(count: usize) {
    metrics::gauge!("lbsync_backends").set(count as f64);
}

pub fn record_launch() {
    metrics::counter!("lbsync_process_launches_total").increment(1);
}

pub fn record_reload() {
    metrics::counter!("lbsync_process_reloads_total").increment(1);
}
