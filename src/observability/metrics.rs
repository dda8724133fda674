//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_executions_total` (counter): executions by outcome
//! - `dispatch_batches_total` (counter): completed batches
//! - `dispatch_batch_duration_seconds` (histogram): batch wall-clock time
//! - `dispatch_execution_duration_seconds` (histogram): successful execution latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a
//!   recorder is installed
//! - Prometheus exposition is opt-in via configuration

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

use crate::dispatch::Outcome;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the outcome of one execution.
pub fn record_outcome(outcome: &Outcome) {
    counter!("dispatch_executions_total", "outcome" => outcome.label()).increment(1);
    if let Outcome::Success { latency, .. } = outcome {
        histogram!("dispatch_execution_duration_seconds").record(latency.as_secs_f64());
    }
}

/// Record a completed batch.
pub fn record_batch(elapsed: Duration) {
    counter!("dispatch_batches_total").increment(1);
    histogram!("dispatch_batch_duration_seconds").record(elapsed.as_secs_f64());
}
