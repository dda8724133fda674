//! Fan-out dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher::dispatch(endpoint, N, timeout)
//!     → deadline.rs (one SharedDeadline for the batch)
//!     → barrier.rs (CompletionBarrier with N tokens)
//!     → worker.rs × N (request, drain body, classify)
//!     → barrier releases once all N tokens are dropped
//!     → outcome.rs (BatchReport: N outcomes + elapsed)
//! ```
//!
//! # Design Decisions
//! - Executions share only immutable state: client handle, endpoint, deadline
//! - Every execution produces exactly one Outcome
//! - Timeouts are a normal terminal outcome, never an error

pub mod barrier;
pub mod deadline;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod outcome;
pub mod worker;

pub use barrier::{CompletionBarrier, CompletionToken};
pub use deadline::{DeadlineExceeded, SharedDeadline};
pub use dispatcher::{build_client, Dispatcher};
pub use endpoint::Endpoint;
pub use error::{DispatchError, DispatchResult, ExecutionError};
pub use outcome::{BatchReport, ExecutionState, Outcome, OutcomeSummary};
