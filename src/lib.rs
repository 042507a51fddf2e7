//! # Backstop
//!
//! Classification-driven resilience primitives for async Rust.
//!
//! ## Philosophy
//!
//! **Backstop** separates *deciding* from *reporting*: the
//! [classifier](classify()) inspects a failure and decides whether
//! retrying is worthwhile, but the error the caller receives is always
//! the original one, untouched. Classification drives control flow and
//! user-facing messaging; it never replaces the evidence.
//!
//! ## Quick Example
//!
//! ```rust
//! use backstop::{classify, retry, ErrorCategory, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! // Classify a failure from an opaque boundary.
//! let c = classify("Network request failed");
//! assert_eq!(c.category, ErrorCategory::Network);
//! assert!(c.retryable);
//!
//! // Drive an operation with classification-driven retry.
//! let policy = RetryPolicy::new()
//!     .with_max_retries(3)
//!     .with_initial_delay(Duration::from_millis(1));
//!
//! let result: Result<u32, String> = retry(&policy, || async { Ok(42) }).await;
//! assert_eq!(result, Ok(42));
//! # });
//! ```
//!
//! ## Features
//!
//! - `async` (default): the retry executors, timeout wrapper, batcher,
//!   and debouncer, built on tokio.
//! - `jitter`: adds up to 30% random extra to backoff delays.
//! - `tracing`: structured logging of retries, rate limiting, and batch
//!   execution.
//! - `serde`: serialization for the classification vocabulary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod limiter;
pub mod retry;

#[cfg(feature = "async")]
pub mod batch;
#[cfg(feature = "async")]
pub mod debounce;
#[cfg(feature = "async")]
pub mod timeout;

// Re-exports
pub use classify::{classify, Classification, Diagnose, ErrorCategory, ErrorReport, RecoveryAction};
pub use limiter::{RateLimitExceeded, RateLimiter};
pub use retry::{RetryEvent, RetryPolicy, JITTER_FRACTION};

#[cfg(feature = "async")]
pub use batch::{BatchError, Batcher, DEFAULT_BATCH_WINDOW};
#[cfg(feature = "async")]
pub use debounce::{Debouncer, Throttle};
#[cfg(feature = "async")]
pub use retry::{retry, retry_if, retry_with_hooks, HookError};
#[cfg(feature = "async")]
pub use timeout::{with_timeout, TimeoutError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{
        classify, Classification, Diagnose, ErrorCategory, ErrorReport, RecoveryAction,
    };
    pub use crate::limiter::{RateLimitExceeded, RateLimiter};
    pub use crate::retry::{RetryEvent, RetryPolicy};

    #[cfg(feature = "async")]
    pub use crate::batch::{BatchError, Batcher};
    #[cfg(feature = "async")]
    pub use crate::debounce::{Debouncer, Throttle};
    #[cfg(feature = "async")]
    pub use crate::retry::{retry, retry_if, retry_with_hooks};
    #[cfg(feature = "async")]
    pub use crate::timeout::{with_timeout, TimeoutError};
}
