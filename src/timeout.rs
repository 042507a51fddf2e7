//! Deadline enforcement for asynchronous operations.
//!
//! There is no built-in cancellation token anywhere in this crate;
//! wrapping an operation (or a whole retry run) in [`with_timeout`] is
//! the supported way to bound it. An elapsed deadline classifies as a
//! retryable timeout, so `with_timeout` composes naturally inside an
//! operation driven by [`retry`](crate::retry()).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::classify::Diagnose;

/// Error returned by [`with_timeout`].
///
/// Wraps either an elapsed deadline or the inner operation's own error.
///
/// # Examples
///
/// ```rust
/// use backstop::{with_timeout, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = with_timeout(Duration::from_millis(10), async {
///     tokio::time::sleep(Duration::from_secs(10)).await;
///     Ok::<_, String>(42)
/// })
/// .await;
///
/// match result {
///     Err(TimeoutError::Timeout { duration }) => {
///         assert_eq!(duration, Duration::from_millis(10));
///     }
///     _ => panic!("expected timeout"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The operation did not complete within the deadline.
    Timeout {
        /// The deadline that was exceeded.
        duration: Duration,
    },
    /// The operation failed on its own before the deadline.
    Inner(E),
}

impl<E> TimeoutError<E> {
    /// Returns true if the deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the operation failed on its own.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Get the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "operation timed out after {:?}", duration),
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}

/// An elapsed deadline classifies as a retryable timeout; an inner error
/// classifies as whatever it is.
impl<E: Diagnose> Diagnose for TimeoutError<E> {
    fn message(&self) -> String {
        match self {
            Self::Timeout { duration } => format!("operation timed out after {:?}", duration),
            Self::Inner(e) => e.message(),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => e.name(),
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => e.status(),
        }
    }
}

/// Run a fallible future under a deadline.
///
/// Success and inner failure pass through; an elapsed deadline becomes
/// [`TimeoutError::Timeout`].
///
/// # Examples
///
/// ```rust
/// use backstop::with_timeout;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = with_timeout(Duration::from_secs(1), async { Ok::<_, String>(42) }).await;
/// assert_eq!(result, Ok(42));
/// # });
/// ```
pub async fn with_timeout<T, E, Fut>(duration: Duration, future: Fut) -> Result<T, TimeoutError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TimeoutError::Inner(e)),
        Err(_) => Err(TimeoutError::Timeout { duration }),
    }
}

#[cfg(test)]
mod timeout_tests {
    use super::*;
    use crate::classify::{classify, ErrorCategory};

    #[tokio::test]
    async fn test_timeout_triggers() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(42)
        })
        .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, String>(42) }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result =
            with_timeout(Duration::from_secs(1), async { Err::<i32, _>("inner error") }).await;

        let err = result.unwrap_err();
        assert!(err.is_inner());
        assert_eq!(err.into_inner(), Some("inner error"));
    }

    #[tokio::test]
    async fn test_elapsed_deadline_classifies_retryable() {
        let result = with_timeout(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(())
        })
        .await;

        let c = classify(&result.unwrap_err());
        assert_eq!(c.category, ErrorCategory::Timeout);
        assert!(c.retryable);
    }

    #[tokio::test]
    async fn test_inner_error_classifies_as_itself() {
        let result = with_timeout(Duration::from_secs(1), async {
            Err::<(), _>("access denied".to_string())
        })
        .await;

        let c = classify(&result.unwrap_err());
        assert_eq!(c.category, ErrorCategory::Permission);
        assert!(!c.retryable);
    }

    #[test]
    fn test_display_variants() {
        let timeout: TimeoutError<String> = TimeoutError::Timeout {
            duration: Duration::from_secs(5),
        };
        assert!(timeout.to_string().contains("timed out"));

        let inner = TimeoutError::Inner("failed".to_string());
        assert_eq!(inner.to_string(), "failed");
    }
}
