//! A single execution: one request against the shared endpoint.
//!
//! # Responsibilities
//! - Build the request
//! - Send it, bounded by the shared deadline
//! - Drain and release the body once the response has arrived
//! - Classify the result into exactly one `Outcome`
//!
//! # Design Decisions
//! - The deadline only races the wait for the response head; a response that
//!   arrived in time is a `Success` even if its body is still streaming
//! - Transport errors whose cause is a timeout count as `TimedOut`
//! - No error escapes the execution; everything becomes an `Outcome`
//! - The response (and its body) is dropped before returning on every path

use reqwest::{Client, Response};
use std::error::Error as StdError;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::dispatch::deadline::SharedDeadline;
use crate::dispatch::endpoint::Endpoint;
use crate::dispatch::error::ExecutionError;
use crate::dispatch::outcome::{ExecutionState, Outcome};

/// Upper bound on draining a body after the response head arrived.
const BODY_DRAIN_LIMIT: Duration = Duration::from_secs(5);

/// Bytes of the body echoed in the per-success debug log.
const BODY_PREVIEW_BYTES: usize = 64;

/// Run one execution to a terminal outcome.
pub async fn execute(
    client: &Client,
    endpoint: &Endpoint,
    deadline: SharedDeadline,
    index: usize,
) -> Outcome {
    let started = Instant::now();
    tracing::trace!(execution = index, state = ?ExecutionState::Idle, "Execution created");

    let request = match client.get(endpoint.url().clone()).build() {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(execution = index, error = %e, "Failed to build request");
            return Outcome::Failed(ExecutionError::MalformedRequest(error_chain(&e)));
        }
    };

    tracing::trace!(execution = index, state = ?ExecutionState::Requesting, "Sending request");

    let outcome = match deadline.run(client.execute(request)).await {
        Ok(Ok(response)) => {
            let latency = started.elapsed();
            let status = response.status().as_u16();
            let body_bytes = drain_body(response, index).await;
            Outcome::Success {
                status,
                body_bytes,
                latency,
            }
        }
        Ok(Err(e)) if is_timeout(&e) => Outcome::TimedOut {
            after: started.elapsed(),
        },
        Ok(Err(e)) => {
            tracing::error!(execution = index, error = %error_chain(&e), "Upstream error");
            Outcome::Failed(ExecutionError::Transport(error_chain(&e)))
        }
        Err(_) => Outcome::TimedOut {
            after: started.elapsed(),
        },
    };

    match &outcome {
        Outcome::Success { status, latency, .. } => {
            tracing::debug!(execution = index, status, latency = ?latency, "Execution succeeded");
        }
        Outcome::TimedOut { after } => {
            tracing::warn!(
                execution = index,
                after = ?after,
                timeout = ?deadline.timeout(),
                "timeout"
            );
        }
        Outcome::Failed(_) => {}
    }

    outcome
}

/// Read the body to completion so the connection can return to the pool.
///
/// Returns the body length, or `None` if the read failed or outlived
/// `BODY_DRAIN_LIMIT`. Either way the response is released on return.
async fn drain_body(response: Response, index: usize) -> Option<usize> {
    match time::timeout(BODY_DRAIN_LIMIT, response.bytes()).await {
        Ok(Ok(body)) => {
            let preview = String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_BYTES)]);
            tracing::debug!(execution = index, body = %preview.trim_end(), "Response body");
            Some(body.len())
        }
        Ok(Err(e)) => {
            tracing::debug!(execution = index, error = %error_chain(&e), "Body read failed");
            None
        }
        Err(_) => {
            tracing::debug!(execution = index, "Body still streaming, dropping it");
            None
        }
    }
}

/// True when the error, or anything in its source chain, is a timeout.
fn is_timeout(error: &reqwest::Error) -> bool {
    if error.is_timeout() {
        return true;
    }
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Render an error with its causes, outermost first.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<dyn StdError + Send + Sync>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_includes_causes() {
        let inner = Layer("connection refused", None);
        let outer = Layer("error sending request", Some(Box::new(inner)));
        assert_eq!(
            error_chain(&outer),
            "error sending request: connection refused"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let deadline = SharedDeadline::after(std::time::Duration::from_secs(5));
        let outcome = execute(&client, &Endpoint::from_addr(addr), deadline, 0).await;

        match outcome {
            Outcome::Failed(ExecutionError::Transport(message)) => {
                assert!(!message.is_empty());
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_deadline_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = Client::builder().no_proxy().build().unwrap();
        let deadline = SharedDeadline::after(std::time::Duration::from_millis(50));
        let outcome = execute(&client, &Endpoint::from_addr(addr), deadline, 0).await;

        assert!(outcome.is_timed_out(), "got {:?}", outcome);
    }
}
