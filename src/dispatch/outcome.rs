//! Execution outcomes and batch reports.

use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::dispatch::error::{DispatchError, DispatchResult, ExecutionError};

/// Lifecycle of a single execution.
///
/// ```text
/// Idle → Requesting → Succeeded
///                   → TimedOut
///                   → Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Idle,
    Requesting,
    Succeeded,
    TimedOut,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::TimedOut | Self::Failed)
    }
}

/// Terminal classification of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The response head arrived before the deadline. The body is drained
    /// afterwards; `body_bytes` is `None` when that read did not complete.
    Success {
        status: u16,
        body_bytes: Option<usize>,
        latency: Duration,
    },
    /// The shared deadline fired first.
    TimedOut { after: Duration },
    /// Any other failure.
    Failed(ExecutionError),
}

impl Outcome {
    pub fn state(&self) -> ExecutionState {
        match self {
            Outcome::Success { .. } => ExecutionState::Succeeded,
            Outcome::TimedOut { .. } => ExecutionState::TimedOut,
            Outcome::Failed(_) => ExecutionState::Failed,
        }
    }

    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::TimedOut { .. } => "timed_out",
            Outcome::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub total: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
}

/// Everything a finished batch produced.
///
/// `outcomes` holds exactly one entry per execution, in launch order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub outcomes: Vec<Outcome>,
    /// Wall-clock time from dispatch start until the barrier released.
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn timeouts(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_timed_out()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn summary(&self) -> OutcomeSummary {
        self.outcomes
            .iter()
            .fold(
                OutcomeSummary {
                    total: self.outcomes.len(),
                    ..OutcomeSummary::default()
                },
                |mut summary, outcome| {
                    match outcome {
                        Outcome::Success { .. } => summary.succeeded += 1,
                        Outcome::TimedOut { .. } => summary.timed_out += 1,
                        Outcome::Failed(_) => summary.failed += 1,
                    }
                    summary
                },
            )
    }

    pub fn first_failure(&self) -> Option<&ExecutionError> {
        self.outcomes.iter().find_map(|o| match o {
            Outcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Treat any failed execution as fatal for the batch.
    ///
    /// Timeouts are not failures.
    pub fn into_result(self) -> DispatchResult<Self> {
        match self.first_failure() {
            Some(first) => Err(DispatchError::ExecutionFailed {
                failed: self.failures(),
                total: self.outcomes.len(),
                first: first.clone(),
            }),
            None => Ok(self),
        }
    }
}
