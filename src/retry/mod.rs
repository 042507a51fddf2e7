//! Classification-driven retry with exponential backoff.
//!
//! Two cooperating parts, kept deliberately separate:
//!
//! - **Policy** ([`RetryPolicy`]): pure data -- attempt budget, backoff
//!   schedule, delay ceiling. No side effects, easily testable.
//! - **Executors** ([`retry`], [`retry_if`], [`retry_with_hooks`]): drive
//!   repeated invocation of an asynchronous operation, consulting the
//!   [classifier](crate::classify) (or a caller predicate) after each
//!   failure to decide whether to continue.
//!
//! The executors never wrap or rename errors. Whatever failure the final
//! attempt produced is exactly what the caller receives; classification
//! only decides control flow.
//!
//! # Quick Start
//!
//! ```rust
//! use backstop::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::new()
//!     .with_max_retries(3)
//!     .with_initial_delay(Duration::from_millis(1));
//!
//! let result: Result<u32, String> = retry(&policy, || async { Ok(42) }).await;
//! assert_eq!(result, Ok(42));
//! # });
//! ```
//!
//! # Jitter
//!
//! Enable the `jitter` feature to add a uniform random extra of up to 30%
//! to each backoff wait, preventing synchronized retry storms:
//!
//! ```toml
//! backstop = { version = "...", features = ["jitter"] }
//! ```

mod policy;

#[cfg(feature = "async")]
mod executor;

pub use policy::{RetryEvent, RetryPolicy, JITTER_FRACTION};

#[cfg(feature = "async")]
pub use executor::{retry, retry_if, retry_with_hooks, HookError};
