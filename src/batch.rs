//! Windowed call batching.
//!
//! Submissions made within one batching window are collected and executed
//! together, grouped by a caller-supplied key. Grouping keeps related
//! calls (same remote endpoint, same tenant) visible as a unit in logs
//! and lets the whole group settle concurrently.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::classify::Diagnose;

/// Default batching window.
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(50);

struct Pending<T, E> {
    key: String,
    op: BoxFuture<'static, Result<T, E>>,
    reply: oneshot::Sender<Result<T, BatchError<E>>>,
}

struct Shared<T, E> {
    window: Duration,
    pending: Mutex<Vec<Pending<T, E>>>,
}

/// Collects asynchronous calls for one batching window, then executes
/// them together.
///
/// Cloning a `Batcher` yields another handle onto the same queue. The
/// first submission into an empty queue arms the window timer; when it
/// fires, everything queued since executes concurrently and each
/// submitter receives its own result.
///
/// # Examples
///
/// ```rust
/// use backstop::Batcher;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let batcher: Batcher<u32, String> = Batcher::new(Duration::from_millis(5));
///
/// let (a, b) = tokio::join!(
///     batcher.submit("ledger", async { Ok(1) }),
///     batcher.submit("ledger", async { Ok(2) }),
/// );
///
/// assert_eq!(a, Ok(1));
/// assert_eq!(b, Ok(2));
/// # });
/// ```
pub struct Batcher<T, E> {
    inner: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Batcher<T, E> {
    fn clone(&self) -> Self {
        Batcher {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Batcher<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .inner
            .pending
            .lock()
            .map(|queue| queue.len())
            .unwrap_or(0);
        f.debug_struct("Batcher")
            .field("window", &self.inner.window)
            .field("pending", &pending)
            .finish()
    }
}

impl<T, E> Default for Batcher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_WINDOW)
    }
}

impl<T, E> Batcher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a batcher with the given window.
    pub fn new(window: Duration) -> Self {
        Batcher {
            inner: Arc::new(Shared {
                window,
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue an operation under `key` and await its result.
    ///
    /// The operation runs when the current window fires, alongside
    /// everything else queued in the same window.
    pub async fn submit<F>(&self, key: impl Into<String>, op: F) -> Result<T, BatchError<E>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let arm_timer = {
            let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.push(Pending {
                key: key.into(),
                op: op.boxed(),
                reply: tx,
            });
            pending.len() == 1
        };

        if arm_timer {
            let shared = self.inner.clone();
            tokio::spawn(async move {
                tokio::time::sleep(shared.window).await;
                flush(&shared).await;
            });
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(BatchError::Cleared),
        }
    }

    /// Reject everything still queued with [`BatchError::Cleared`].
    pub fn clear(&self) {
        let drained: Vec<Pending<T, E>> = {
            let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain(..).collect()
        };

        for entry in drained {
            let _ = entry.reply.send(Err(BatchError::Cleared));
        }
    }

    /// Number of submissions waiting for the current window to fire.
    pub fn pending_count(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

async fn flush<T, E>(shared: &Shared<T, E>)
where
    T: Send + 'static,
    E: Send + 'static,
{
    let batch: Vec<Pending<T, E>> = {
        let mut pending = shared.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.drain(..).collect()
    };
    if batch.is_empty() {
        return;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(calls = batch.len(), "executing batch");

    let mut groups: HashMap<String, Vec<Pending<T, E>>> = HashMap::new();
    for entry in batch {
        groups.entry(entry.key.clone()).or_default().push(entry);
    }

    #[cfg(feature = "tracing")]
    for (key, entries) in &groups {
        tracing::debug!(key = %key, calls = entries.len(), "batch group");
    }

    let group_tasks = groups.into_values().map(|entries| {
        join_all(entries.into_iter().map(|entry| async move {
            let result = entry.op.await;
            let _ = entry.reply.send(result.map_err(BatchError::Failed));
        }))
    });
    join_all(group_tasks).await;
}

/// Error returned by [`Batcher::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError<E> {
    /// The batch was cleared before this submission executed.
    Cleared,
    /// The operation itself failed.
    Failed(E),
}

impl<E> BatchError<E> {
    /// Returns true if the submission was cleared without executing.
    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    /// Get the operation's own error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Cleared => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for BatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cleared => f.write_str("batch cleared before execution"),
            Self::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BatchError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cleared => None,
            Self::Failed(e) => Some(e),
        }
    }
}

impl<E: Diagnose> Diagnose for BatchError<E> {
    fn message(&self) -> String {
        match self {
            Self::Cleared => "batch cleared before execution".to_string(),
            Self::Failed(e) => e.message(),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Cleared => None,
            Self::Failed(e) => e.name(),
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Cleared => None,
            Self::Failed(e) => e.status(),
        }
    }
}

#[cfg(test)]
mod batch_tests {
    use super::*;

    #[tokio::test]
    async fn test_every_submission_resolves() {
        let batcher: Batcher<u32, String> = Batcher::new(Duration::from_millis(5));

        let (a, b, c) = tokio::join!(
            batcher.submit("x", async { Ok(1) }),
            batcher.submit("x", async { Ok(2) }),
            batcher.submit("y", async { Ok(3) }),
        );

        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
        assert_eq!(c, Ok(3));
    }

    #[tokio::test]
    async fn test_failures_reach_their_submitter_only() {
        let batcher: Batcher<u32, String> = Batcher::new(Duration::from_millis(5));

        let (good, bad) = tokio::join!(
            batcher.submit("x", async { Ok(10) }),
            batcher.submit("x", async { Err("boom".to_string()) }),
        );

        assert_eq!(good, Ok(10));
        assert_eq!(bad, Err(BatchError::Failed("boom".to_string())));
    }

    #[tokio::test]
    async fn test_clear_rejects_pending_submissions() {
        let batcher: Batcher<u32, String> = Batcher::new(Duration::from_secs(10));

        let handle = {
            let batcher = batcher.clone();
            tokio::spawn(async move { batcher.submit("x", async { Ok(1) }).await })
        };

        // Let the submission land in the queue, then clear it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(batcher.pending_count(), 1);
        batcher.clear();

        let result = handle.await.unwrap();
        assert_eq!(result, Err(BatchError::Cleared));
        assert_eq!(batcher.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_queue_drains_after_the_window() {
        let batcher: Batcher<u32, String> = Batcher::new(Duration::from_millis(5));

        let result = batcher.submit("x", async { Ok(1) }).await;
        assert_eq!(result, Ok(1));
        assert_eq!(batcher.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_submissions_after_a_flush_start_a_new_window() {
        let batcher: Batcher<u32, String> = Batcher::new(Duration::from_millis(5));

        assert_eq!(batcher.submit("x", async { Ok(1) }).await, Ok(1));
        assert_eq!(batcher.submit("x", async { Ok(2) }).await, Ok(2));
    }

    #[test]
    fn test_batch_error_accessors() {
        let cleared: BatchError<String> = BatchError::Cleared;
        assert!(cleared.is_cleared());
        assert_eq!(cleared.into_inner(), None);

        let failed = BatchError::Failed("x".to_string());
        assert!(!failed.is_cleared());
        assert_eq!(failed.into_inner(), Some("x".to_string()));
    }

    #[test]
    fn test_batch_error_classifies_through_inner() {
        use crate::classify::{classify, ErrorCategory};

        let err: BatchError<&str> = BatchError::Failed("connection refused");
        assert_eq!(classify(&err).category, ErrorCategory::Network);

        let cleared: BatchError<&str> = BatchError::Cleared;
        assert_eq!(classify(&cleared).category, ErrorCategory::Unknown);
    }
}
