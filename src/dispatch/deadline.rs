//! Shared batch deadline.
//!
//! One deadline is derived from the configured timeout when a batch starts and
//! copied into every execution. It is an absolute instant, so executions that
//! start late still expire together with the rest of the batch.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};

/// The deadline fired before the wrapped future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// Absolute expiry shared read-only by all executions of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedDeadline {
    started_at: Instant,
    expires_at: Instant,
}

impl SharedDeadline {
    /// Deadline expiring `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        let started_at = Instant::now();
        Self {
            started_at,
            expires_at: started_at + timeout,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Configured timeout this deadline was derived from.
    pub fn timeout(&self) -> Duration {
        self.expires_at - self.started_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Race `future` against the deadline.
    ///
    /// A future that is already complete when the deadline fires keeps its
    /// result; the deadline only interrupts work still pending.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        time::timeout_at(self.expires_at, future)
            .await
            .map_err(|_| DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expiry_tracks_timeout() {
        let deadline = SharedDeadline::after(Duration::from_millis(50));
        assert_eq!(deadline.timeout(), Duration::from_millis(50));
        assert!(!deadline.is_expired());

        time::advance(Duration::from_millis(20)).await;
        assert_eq!(deadline.remaining(), Duration::from_millis(30));

        time::advance(Duration::from_millis(30)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_interrupts_slow_future() {
        let deadline = SharedDeadline::after(Duration::from_millis(5));
        let result = deadline
            .run(time::sleep(Duration::from_millis(10)))
            .await;
        assert_eq!(result, Err(DeadlineExceeded));
        assert_eq!(DeadlineExceeded.to_string(), "deadline exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_passes_fast_future() {
        let deadline = SharedDeadline::after(Duration::from_millis(50));
        let result = deadline
            .run(async {
                time::sleep(Duration::from_millis(10)).await;
                7
            })
            .await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copies_share_expiry() {
        let deadline = SharedDeadline::after(Duration::from_millis(5));
        let copy = deadline;
        time::advance(Duration::from_millis(3)).await;
        assert_eq!(copy.expires_at(), deadline.expires_at());
        assert_eq!(copy.remaining(), Duration::from_millis(2));
    }
}
