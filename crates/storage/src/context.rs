//! Per-call deadlines and cancellation.
//!
//! The request layer hands every storage call a [`CallContext`]. Wrapping a
//! backend future with [`CallContext::run`] guarantees the caller gets an
//! answer by the deadline: the in-flight future is dropped and the call fails
//! with [`StorageError::Timeout`] (deadline) or [`StorageError::Cancelled`]
//! (token fired). Backends never hold locks across their own await points,
//! so dropping a call cannot leave shared state half-updated.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use portcullis_storage::{CallContext, MemoryBackend, StorageBackend};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let backend = MemoryBackend::new();
//! let ctx = CallContext::with_timeout(Duration::from_secs(2));
//!
//! ctx.run(backend.set("acme", "cards", "12345", b"{}".to_vec())).await.unwrap();
//! assert!(ctx.run(backend.exists("acme", "cards", "12345")).await.unwrap());
//! # });
//! ```

use std::{future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{StorageError, StorageResult};

/// Deadline and cancellation handle for one logical request.
///
/// Cloning is cheap; clones share the cancellation token, so cancelling any
/// clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// Creates a context with no deadline and a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose deadline is `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replaces the cancellation token, e.g. with a child of the server's
    /// shutdown token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels every call running under this context (and its clones).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the context has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drives `operation` to completion unless the deadline passes or the
    /// token is cancelled first.
    ///
    /// Cancellation wins ties: a context that is already cancelled fails
    /// without polling `operation` at all.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Cancelled`] or [`StorageError::Timeout`], or
    /// the error produced by `operation` itself.
    pub async fn run<F, T>(&self, operation: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(StorageError::cancelled());
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, operation)
                    .await
                    .unwrap_or_else(|_elapsed| Err(StorageError::timeout())),
                None => operation.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StorageError::cancelled()),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let ctx = CallContext::new();
        let value = ctx.run(async { Ok::<_, StorageError>(7) }).await;
        assert_eq!(value.ok(), Some(7));
    }

    #[tokio::test]
    async fn test_run_passes_through_error() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let result: StorageResult<()> =
            ctx.run(async { Err(StorageError::not_found("k")) }).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let ctx = CallContext::with_timeout(Duration::from_millis(50));
        let result: StorageResult<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        crate::assert_timeout!(result);
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_operation() {
        let ctx = CallContext::new();
        ctx.cancel();

        let polled = std::sync::atomic::AtomicBool::new(false);
        let result: StorageResult<()> = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(StorageError::Cancelled)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_call() {
        let ctx = CallContext::new();
        let canceller = ctx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result: StorageResult<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(StorageError::Cancelled)));
    }

    #[tokio::test]
    async fn test_child_token_follows_parent() {
        let shutdown = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(shutdown.child_token());
        shutdown.cancel();
        assert!(ctx.is_cancelled());
    }
}
