//! The [`Diagnose`] boundary trait and the [`ErrorReport`] carrier.
//!
//! Errors produced inside an application should implement [`Diagnose`]
//! directly, exposing whatever structure they have. Errors crossing an
//! opaque boundary (a transport library, an FFI layer, a remote call)
//! usually arrive as little more than text; wrap those in an
//! [`ErrorReport`] so the classifier can still see a name or status code
//! when one is known.

use std::fmt;

/// Access to the failure surface the classifier inspects.
///
/// Three facets, all optional except the message: free-form message text,
/// an error name tag (e.g. `ValidationError`), and a numeric status code.
/// The classifier lower-cases text before matching, so implementations
/// should not bother normalizing.
///
/// # Examples
///
/// ```rust
/// use backstop::{classify, Diagnose, ErrorCategory};
///
/// #[derive(Debug)]
/// struct UpstreamError {
///     status: u16,
///     detail: String,
/// }
///
/// impl Diagnose for UpstreamError {
///     fn message(&self) -> String {
///         self.detail.clone()
///     }
///
///     fn status(&self) -> Option<u16> {
///         Some(self.status)
///     }
/// }
///
/// let err = UpstreamError { status: 429, detail: "slow down".into() };
/// assert_eq!(classify(&err).category, ErrorCategory::RateLimit);
/// ```
pub trait Diagnose {
    /// Human-readable description of the failure.
    fn message(&self) -> String;

    /// Error name tag, when the producing layer assigns one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Numeric status code, when the failure maps to one.
    fn status(&self) -> Option<u16> {
        None
    }
}

impl<T: Diagnose + ?Sized> Diagnose for &T {
    fn message(&self) -> String {
        (**self).message()
    }

    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn status(&self) -> Option<u16> {
        (**self).status()
    }
}

impl Diagnose for str {
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Diagnose for String {
    fn message(&self) -> String {
        self.clone()
    }
}

/// I/O errors classify through their kind text: `TimedOut` displays as
/// "timed out", `ConnectionRefused` as "connection refused", and so on,
/// which lands them in the category a human would pick.
impl Diagnose for std::io::Error {
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Concrete carrier for failures from opaque boundaries.
///
/// Mirrors the minimal shape remote errors tend to have: message text,
/// an optional name tag, an optional status code. Implements
/// [`std::error::Error`], so it can be used as an error type in its own
/// right, and [`Diagnose`], so it classifies without further ceremony.
///
/// # Examples
///
/// ```rust
/// use backstop::{classify, ErrorCategory, ErrorReport, RecoveryAction};
///
/// let err = ErrorReport::new("field is required")
///     .with_name("ValidationError");
///
/// let c = classify(&err);
/// assert_eq!(c.category, ErrorCategory::Validation);
/// assert_eq!(c.action, RecoveryAction::CorrectInput);
/// assert!(!c.retryable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    message: String,
    name: Option<String>,
    status: Option<u16>,
}

impl ErrorReport {
    /// Create a report carrying only message text.
    pub fn new(message: impl Into<String>) -> Self {
        ErrorReport {
            message: message.into(),
            name: None,
            status: None,
        }
    }

    /// Attach an error name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a numeric status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.status) {
            (Some(name), Some(status)) => {
                write!(f, "{} ({}, status {})", self.message, name, status)
            }
            (Some(name), None) => write!(f, "{} ({})", self.message, name),
            (None, Some(status)) => write!(f, "{} (status {})", self.message, status),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ErrorReport {}

impl Diagnose for ErrorReport {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}
