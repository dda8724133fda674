//! Simulated endpoint server.
//!
//! # Responsibilities
//! - Answer every GET with a fixed plaintext body after a fixed latency
//! - Bind to an ephemeral port by default and report the bound address
//! - Stop on the lifecycle shutdown signal
//!
//! Stands in for a real upstream so both deadline regimes can be exercised
//! locally: timeout shorter than latency, and timeout longer than latency.

use axum::{extract::State, routing::get, Router};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::EndpointConfig;
use crate::dispatch::Endpoint;
use crate::lifecycle::Shutdown;

/// How long a stopping endpoint waits for in-flight responses.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct EndpointState {
    latency: Duration,
    body: String,
    requests: AtomicUsize,
}

/// HTTP server that responds slowly on purpose.
pub struct DelayedEndpoint {
    state: Arc<EndpointState>,
    bind_address: String,
}

impl DelayedEndpoint {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            state: Arc::new(EndpointState {
                latency: config.latency(),
                body: config.body,
                requests: AtomicUsize::new(0),
            }),
            bind_address: config.bind_address,
        }
    }

    fn build_router(&self) -> Router {
        Router::new()
            .route("/", get(delayed_handler))
            .route("/{*path}", get(delayed_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            latency = ?self.state.latency,
            "Simulated endpoint starting"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Simulated endpoint stopped");
        Ok(())
    }

    /// Bind the configured address and serve in the background.
    pub async fn spawn(self) -> Result<RunningEndpoint, io::Error> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        let addr = listener.local_addr()?;
        let state = self.state.clone();
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(self.run(listener, shutdown.subscribe()));

        Ok(RunningEndpoint {
            addr,
            state,
            shutdown,
            handle,
        })
    }
}

async fn delayed_handler(State(state): State<Arc<EndpointState>>) -> String {
    state.requests.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(state.latency).await;
    state.body.clone()
}

/// Handle to a simulated endpoint serving in the background.
pub struct RunningEndpoint {
    addr: SocketAddr,
    state: Arc<EndpointState>,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), io::Error>>,
}

impl RunningEndpoint {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_addr(self.addr)
    }

    /// Requests received so far, answered or not.
    pub fn requests_received(&self) -> usize {
        self.state.requests.load(Ordering::Relaxed)
    }

    /// Signal shutdown and wait briefly for in-flight responses.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        let mut handle = self.handle;
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Simulated endpoint exited with error"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Simulated endpoint task failed"),
            Err(_) => {
                tracing::debug!("Simulated endpoint still draining, aborting");
                handle.abort();
            }
        }
    }
}
