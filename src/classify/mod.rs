//! Error classification.
//!
//! Maps an arbitrary failure into a [`Classification`]: a category, two
//! recovery bits, a user-facing message, and a suggested remediation. The
//! retry executors consult the `retryable` bit to decide control flow;
//! everything else exists for the presentation layer. Classification
//! *decides*, it never *reports* -- the original error object always
//! travels to the caller untouched.
//!
//! # Quick Start
//!
//! ```rust
//! use backstop::{classify, ErrorCategory, RecoveryAction};
//!
//! let c = classify("Network request failed");
//! assert_eq!(c.category, ErrorCategory::Network);
//! assert_eq!(c.action, RecoveryAction::Retry);
//! assert!(c.retryable);
//! ```
//!
//! # Boundary errors
//!
//! Typed application errors implement [`Diagnose`] directly. Failures from
//! opaque boundaries -- transports, FFI, remote services -- get wrapped in
//! an [`ErrorReport`] carrying whatever facets survived the crossing:
//!
//! ```rust
//! use backstop::{classify, ErrorCategory, ErrorReport};
//!
//! let err = ErrorReport::new("no such proposal").with_status(404);
//! assert_eq!(classify(&err).category, ErrorCategory::NotFound);
//! ```

mod category;
mod diagnose;
mod rules;

pub use category::{ErrorCategory, RecoveryAction};
pub use diagnose::{Diagnose, ErrorReport};

use std::borrow::Cow;

/// The classifier's verdict on one failure.
///
/// Constructed fresh per failure, never mutated. `recoverable` says
/// whether *any* automated recovery is plausible; `retryable` says
/// whether re-running the same operation is the recovery. Validation
/// failures are the canonical split: recoverable (fix the input) but not
/// retryable (the same request fails the same way).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    /// Broad failure category.
    pub category: ErrorCategory,
    /// Whether automated recovery is plausible at all.
    pub recoverable: bool,
    /// Whether re-invoking the same operation is appropriate.
    pub retryable: bool,
    /// Human-readable text for display.
    pub user_message: Cow<'static, str>,
    /// Suggested remediation for the presentation layer.
    pub action: RecoveryAction,
}

/// Classify a failure.
///
/// Pure and total: never fails, never panics, falls back to
/// [`ErrorCategory::Unknown`] when no rule matches. Message and name text
/// are lower-cased before matching; rule precedence is fixed (see
/// [`ErrorCategory`] for the category list and the module docs in
/// `rules.rs` for why the order matters).
///
/// # Examples
///
/// ```rust
/// use backstop::{classify, ErrorCategory};
///
/// assert_eq!(classify("connection refused").category, ErrorCategory::Network);
/// assert_eq!(classify("deadline exceeded").category, ErrorCategory::Timeout);
/// assert_eq!(classify("quota conflict").category, ErrorCategory::Conflict);
/// assert_eq!(classify("???").category, ErrorCategory::Unknown);
/// ```
pub fn classify<E: Diagnose + ?Sized>(error: &E) -> Classification {
    let original = error.message();
    let message = original.to_lowercase();
    let name = error.name().map(str::to_lowercase);
    rules::match_rules(&message, name.as_deref(), error.status(), &original)
}
