//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the dispatch target (configured URL or simulated endpoint)
//! - Build the dispatcher and its client from configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The simulated endpoint is started before the dispatcher is built

use thiserror::Error;

use crate::config::DispatcherConfig;
use crate::dispatch::{DispatchError, Dispatcher, Endpoint};
use crate::http::{DelayedEndpoint, RunningEndpoint};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to start simulated endpoint: {0}")]
    Endpoint(#[from] std::io::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Everything needed to run batches.
pub struct Prepared {
    pub dispatcher: Dispatcher,
    pub endpoint: Endpoint,
    /// Present when the target is the simulated endpoint.
    pub server: Option<RunningEndpoint>,
}

impl Prepared {
    /// Stop the simulated endpoint, if one was started.
    pub async fn shutdown(self) {
        if let Some(server) = self.server {
            server.shutdown().await;
        }
    }
}

/// Resolve the target and build the dispatcher.
pub async fn prepare(config: &DispatcherConfig) -> Result<Prepared, StartupError> {
    let (endpoint, server) = match &config.dispatch.endpoint {
        Some(url) => (Endpoint::parse(url)?, None),
        None => {
            let server = DelayedEndpoint::new(config.endpoint.clone()).spawn().await?;
            (server.endpoint(), Some(server))
        }
    };

    let dispatcher = Dispatcher::from_config(&config.client)?;

    tracing::info!(
        endpoint = %endpoint,
        simulated = server.is_some(),
        worker_count = config.dispatch.worker_count,
        timeout_ms = config.dispatch.timeout_ms,
        "Configuration loaded"
    );

    Ok(Prepared {
        dispatcher,
        endpoint,
        server,
    })
}
