//! Error definitions for batch dispatch.

use thiserror::Error;

/// Errors that prevent a batch from being launched, or that a caller
/// raises after inspecting a completed batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A batch needs at least one execution.
    #[error("Worker count must be at least 1")]
    NoWorkers,

    /// Outbound client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// At least one execution in the batch failed.
    #[error("{failed} of {total} executions failed; first failure: {first}")]
    ExecutionFailed {
        failed: usize,
        total: usize,
        first: ExecutionError,
    },
}

/// Why a single execution ended in `Outcome::Failed`.
///
/// Carries messages rather than source errors so that outcomes stay
/// clonable and comparable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The request could not be constructed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Connecting to, or talking to, the endpoint failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The execution task panicked before producing an outcome.
    #[error("Execution panicked: {0}")]
    Panicked(String),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
