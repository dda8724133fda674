//! Fan-out request dispatcher.
//!
//! # Responsibilities
//! - Own the outbound HTTP client shared by every execution
//! - Derive one deadline per batch and launch one task per execution
//! - Wait on the completion barrier, then collect outcomes in launch order
//!
//! # Design Decisions
//! - A failing execution never aborts the batch; callers decide via
//!   `BatchReport::into_result`
//! - Elapsed time is taken when the barrier releases
//! - Panicking executions are reported as `Failed`, not propagated

use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::dispatch::barrier::CompletionBarrier;
use crate::dispatch::deadline::SharedDeadline;
use crate::dispatch::endpoint::Endpoint;
use crate::dispatch::error::{DispatchError, DispatchResult, ExecutionError};
use crate::dispatch::outcome::{BatchReport, Outcome};
use crate::dispatch::worker;
use crate::observability::metrics;

/// Launches batches of concurrent requests against one endpoint.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    /// Create a dispatcher around an already built client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the client from configuration.
    pub fn from_config(config: &ClientConfig) -> DispatchResult<Self> {
        Ok(Self::new(build_client(config)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Run one batch of `worker_count` executions against `endpoint`, all
    /// bound by a deadline `timeout` from now.
    ///
    /// Returns once every execution has produced its outcome. The report
    /// holds exactly `worker_count` outcomes.
    pub async fn dispatch(
        &self,
        endpoint: &Endpoint,
        worker_count: usize,
        timeout: Duration,
    ) -> DispatchResult<BatchReport> {
        if worker_count == 0 {
            return Err(DispatchError::NoWorkers);
        }

        let batch_id = Uuid::new_v4();
        let start = Instant::now();
        let deadline = SharedDeadline::after(timeout);
        let (barrier, tokens) = CompletionBarrier::new(worker_count);

        tracing::info!(
            batch_id = %batch_id,
            endpoint = %endpoint,
            worker_count,
            timeout = ?timeout,
            "Dispatching batch"
        );

        let mut handles = Vec::with_capacity(worker_count);
        for (index, token) in tokens.into_iter().enumerate() {
            let client = self.client.clone();
            let endpoint = endpoint.clone();
            let span = tracing::debug_span!("execution", batch_id = %batch_id, index);
            handles.push(tokio::spawn(
                async move {
                    let outcome = worker::execute(&client, &endpoint, deadline, index).await;
                    // Outcome exists before the completion is counted.
                    drop(token);
                    outcome
                }
                .instrument(span),
            ));
        }

        barrier.wait().await;
        let elapsed = start.elapsed();

        let mut outcomes = Vec::with_capacity(worker_count);
        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(batch_id = %batch_id, execution = index, error = %e, "Execution task failed");
                    Outcome::Failed(ExecutionError::Panicked(e.to_string()))
                }
            };
            metrics::record_outcome(&outcome);
            outcomes.push(outcome);
        }
        metrics::record_batch(elapsed);

        let report = BatchReport {
            batch_id,
            outcomes,
            elapsed,
        };
        let summary = report.summary();
        tracing::info!(
            batch_id = %batch_id,
            succeeded = summary.succeeded,
            timed_out = summary.timed_out,
            failed = summary.failed,
            elapsed = ?elapsed,
            "Batch complete"
        );

        Ok(report)
    }
}

/// Construct the outbound client described by `config`.
pub fn build_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(config.user_agent.clone());

    if let Some(ms) = config.connect_timeout_ms {
        builder = builder.connect_timeout(Duration::from_millis(ms));
    }
    if !config.use_env_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}
