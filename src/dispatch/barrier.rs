//! Counting completion barrier.
//!
//! # Responsibilities
//! - Hand out exactly one token per expected execution
//! - Count a completion when a token is dropped, whatever the exit path
//! - Wake the waiter once every token is gone
//!
//! # Design Decisions
//! - Tokens are RAII guards, so early returns and panics still count
//! - Tokens are not `Clone`; a token can signal only once

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct Inner {
    remaining: AtomicUsize,
    notify: Notify,
}

/// Waiter side of the barrier.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

/// Signals one completion when dropped.
#[derive(Debug)]
pub struct CompletionToken {
    inner: Arc<Inner>,
}

impl CompletionBarrier {
    /// Create a barrier expecting `count` completions, with one token each.
    pub fn new(count: usize) -> (Self, Vec<CompletionToken>) {
        let inner = Arc::new(Inner {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        });
        let tokens = (0..count)
            .map(|_| CompletionToken {
                inner: inner.clone(),
            })
            .collect();
        (Self { inner }, tokens)
    }

    /// Completions still outstanding.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }

    /// Wait until every token has been dropped.
    pub async fn wait(&self) {
        loop {
            // Register before checking so a release in between is not missed.
            let notified = self.inner.notify.notified();
            if self.is_released() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        let previous = self.inner.remaining.fetch_sub(1, Ordering::AcqRel);
        if previous == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_one_token_per_completion() {
        let (barrier, tokens) = CompletionBarrier::new(3);
        assert_eq!(tokens.len(), 3);
        assert_eq!(barrier.remaining(), 3);

        let mut tokens = tokens;
        drop(tokens.pop());
        assert_eq!(barrier.remaining(), 2);
        assert!(!barrier.is_released());

        drop(tokens);
        assert!(barrier.is_released());
    }

    #[tokio::test]
    async fn test_zero_count_is_released() {
        let (barrier, tokens) = CompletionBarrier::new(0);
        assert!(tokens.is_empty());
        barrier.wait().await;
    }

    #[tokio::test]
    async fn test_wait_blocks_until_last_token() {
        let (barrier, tokens) = CompletionBarrier::new(10);
        let mut handles = Vec::new();
        for (i, token) in tokens.into_iter().enumerate() {
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i as u64 * 2)).await;
                drop(token);
            }));
        }

        barrier.wait().await;
        assert_eq!(barrier.remaining(), 0);
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_token_released_on_panic() {
        let (barrier, mut tokens) = CompletionBarrier::new(1);
        let token = tokens.pop().unwrap();
        let handle = tokio::spawn(async move {
            let _token = token;
            panic!("execution blew up");
        });

        barrier.wait().await;
        assert!(handle.await.unwrap_err().is_panic());
    }

    #[tokio::test]
    async fn test_wait_does_not_release_early() {
        let (barrier, mut tokens) = CompletionBarrier::new(2);
        drop(tokens.pop());

        let waited = tokio::time::timeout(Duration::from_millis(20), barrier.wait()).await;
        assert!(waited.is_err(), "barrier released with a token outstanding");

        drop(tokens);
        barrier.wait().await;
    }
}
