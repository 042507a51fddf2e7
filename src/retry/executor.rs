//! Retry executors.
//!
//! Three drivers over the same loop shape: [`retry`] consults the
//! classifier, [`retry_if`] consults a caller predicate, and
//! [`retry_with_hooks`] adds an observability hook to the classified
//! variant. All three surface the most recent underlying error unchanged
//! -- classification decides control flow, it never replaces the error
//! the caller sees.

use std::future::Future;
use std::time::Instant;

use crate::classify::{classify, Diagnose};
use crate::retry::{RetryEvent, RetryPolicy};

/// Error type retry hooks may fail with.
///
/// Hooks are treated as untrusted: a failing hook is logged and
/// discarded, never allowed to abort the retry loop.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Drive an operation with classification-driven retry.
///
/// The operation factory is invoked once per attempt; each failure is
/// classified, and a non-retryable classification propagates the error
/// immediately regardless of remaining budget. Retryable failures are
/// absorbed until the policy's attempt budget is spent, with an
/// exponential (optionally jittered) backoff wait between attempts.
///
/// # Examples
///
/// ```rust
/// use backstop::{retry, RetryPolicy};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(1));
///
/// let calls = AtomicU32::new(0);
/// let result: Result<&str, &str> = retry(&policy, || {
///     let n = calls.fetch_add(1, Ordering::SeqCst);
///     async move {
///         if n < 2 {
///             Err("connection reset") // classifies as Network: retryable
///         } else {
///             Ok("done")
///         }
///     }
/// })
/// .await;
///
/// assert_eq!(result, Ok("done"));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Diagnose,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let verdict = classify(&error);
                if !verdict.retryable {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        category = verdict.category.as_str(),
                        "failure is not retryable, giving up"
                    );
                    return Err(error);
                }

                let Some(delay) = policy.delay_after_attempt(attempt) else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = attempt + 1, "retry budget exhausted");
                    return Err(error);
                };

                let wait = policy.jittered(delay);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = attempt + 1,
                    category = verdict.category.as_str(),
                    wait_ms = wait.as_millis() as u64,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}

/// Drive an operation with predicate-driven retry.
///
/// Like [`retry`], but the caller supplies the retry decision instead of
/// the classifier. Useful when the error type already distinguishes
/// transient from permanent failures.
///
/// # Examples
///
/// ```rust
/// use backstop::{retry_if, RetryPolicy};
/// use std::time::Duration;
///
/// #[derive(Debug, PartialEq)]
/// enum AppError {
///     Transient,
///     Permanent,
/// }
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(1));
///
/// // Permanent failures propagate on first occurrence.
/// let result: Result<(), _> = retry_if(
///     &policy,
///     || async { Err(AppError::Permanent) },
///     |e| matches!(e, AppError::Transient),
/// )
/// .await;
///
/// assert_eq!(result, Err(AppError::Permanent));
/// # });
/// ```
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    mut should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !should_retry(&error) {
                    return Err(error);
                }

                let Some(delay) = policy.delay_after_attempt(attempt) else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = attempt + 1, "retry budget exhausted");
                    return Err(error);
                };

                let wait = policy.jittered(delay);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = attempt + 1,
                    wait_ms = wait.as_millis() as u64,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}

/// Classification-driven retry with an observability hook.
///
/// The hook runs once per absorbed failure, after the backoff wait and
/// before the next attempt, receiving a [`RetryEvent`] describing the
/// failure. Hook failures are logged and discarded; the retry loop is
/// never aborted by its own observer.
///
/// # Examples
///
/// ```rust
/// use backstop::{retry_with_hooks, RetryPolicy};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(1));
///
/// let calls = AtomicU32::new(0);
/// let retries = AtomicU32::new(0);
///
/// let result: Result<&str, &str> = retry_with_hooks(
///     &policy,
///     || {
///         let n = calls.fetch_add(1, Ordering::SeqCst);
///         async move { if n < 2 { Err("offline") } else { Ok("ok") } }
///     },
///     |event| {
///         retries.fetch_add(1, Ordering::SeqCst);
///         assert_eq!(event.attempt, retries.load(Ordering::SeqCst));
///         Ok(())
///     },
/// )
/// .await;
///
/// assert_eq!(result, Ok("ok"));
/// assert_eq!(retries.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub async fn retry_with_hooks<T, E, F, Fut, H>(
    policy: &RetryPolicy,
    mut operation: F,
    mut on_retry: H,
) -> Result<T, E>
where
    E: Diagnose,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnMut(&RetryEvent<'_, E>) -> Result<(), HookError>,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let verdict = classify(&error);
                if !verdict.retryable {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        category = verdict.category.as_str(),
                        "failure is not retryable, giving up"
                    );
                    return Err(error);
                }

                let Some(delay) = policy.delay_after_attempt(attempt) else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = attempt + 1, "retry budget exhausted");
                    return Err(error);
                };

                let wait = policy.jittered(delay);
                tokio::time::sleep(wait).await;

                let event = RetryEvent {
                    attempt: attempt + 1,
                    error: &error,
                    delay: wait,
                    elapsed: start.elapsed(),
                };
                if let Err(hook_error) = on_retry(&event) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %hook_error, "retry hook failed; continuing");
                    #[cfg(not(feature = "tracing"))]
                    let _ = hook_error;
                }

                attempt += 1;
            }
        }
    }
}
