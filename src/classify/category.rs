//! Error categories and suggested recovery actions.

use std::fmt;

/// Broad category assigned to a failure by the classifier.
///
/// Categories partition every failure the retry executors will ever see.
/// The serialized tag names (`NETWORK_ERROR`, ...) are stable and safe to
/// log or ship across process boundaries.
///
/// # Examples
///
/// ```rust
/// use backstop::ErrorCategory;
///
/// assert_eq!(ErrorCategory::Network.as_str(), "NETWORK_ERROR");
/// assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT_ERROR");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCategory {
    /// Connectivity problems: DNS, refused connections, dropped sockets.
    #[cfg_attr(feature = "serde", serde(rename = "NETWORK_ERROR"))]
    Network,
    /// The operation ran out of time.
    #[cfg_attr(feature = "serde", serde(rename = "TIMEOUT_ERROR"))]
    Timeout,
    /// The request itself was malformed or incomplete.
    #[cfg_attr(feature = "serde", serde(rename = "VALIDATION_ERROR"))]
    Validation,
    /// The caller is not allowed to perform the operation.
    #[cfg_attr(feature = "serde", serde(rename = "PERMISSION_ERROR"))]
    Permission,
    /// The remote side is shedding load.
    #[cfg_attr(feature = "serde", serde(rename = "RATE_LIMIT_ERROR"))]
    RateLimit,
    /// The target resource does not exist.
    #[cfg_attr(feature = "serde", serde(rename = "NOT_FOUND_ERROR"))]
    NotFound,
    /// The operation collided with existing state.
    #[cfg_attr(feature = "serde", serde(rename = "CONFLICT_ERROR"))]
    Conflict,
    /// Nothing else matched.
    #[cfg_attr(feature = "serde", serde(rename = "UNKNOWN_ERROR"))]
    Unknown,
}

impl ErrorCategory {
    /// Stable tag name for logs and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "NETWORK_ERROR",
            ErrorCategory::Timeout => "TIMEOUT_ERROR",
            ErrorCategory::Validation => "VALIDATION_ERROR",
            ErrorCategory::Permission => "PERMISSION_ERROR",
            ErrorCategory::RateLimit => "RATE_LIMIT_ERROR",
            ErrorCategory::NotFound => "NOT_FOUND_ERROR",
            ErrorCategory::Conflict => "CONFLICT_ERROR",
            ErrorCategory::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remediation the presentation layer should suggest for a failure.
///
/// The classifier only ever *suggests* an action; acting on it is the
/// caller's concern. `Refresh` corresponds to restarting the client
/// session wholesale and is never produced by the built-in rules -- it
/// exists for presentation layers that add their own rules on top.
///
/// # Examples
///
/// ```rust
/// use backstop::RecoveryAction;
///
/// assert_eq!(RecoveryAction::WaitAndRetry.as_str(), "WAIT_AND_RETRY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecoveryAction {
    /// Re-run the same operation as-is.
    #[cfg_attr(feature = "serde", serde(rename = "RETRY"))]
    Retry,
    /// Fix the input and resubmit.
    #[cfg_attr(feature = "serde", serde(rename = "CORRECT_INPUT"))]
    CorrectInput,
    /// Obtain the missing permission first.
    #[cfg_attr(feature = "serde", serde(rename = "REQUEST_ACCESS"))]
    RequestAccess,
    /// Back off, then re-run.
    #[cfg_attr(feature = "serde", serde(rename = "WAIT_AND_RETRY"))]
    WaitAndRetry,
    /// Restart the client session.
    #[cfg_attr(feature = "serde", serde(rename = "REFRESH_PAGE"))]
    Refresh,
    /// Escalate to a human.
    #[cfg_attr(feature = "serde", serde(rename = "CONTACT_SUPPORT"))]
    ContactSupport,
    /// Navigate away; the target is gone or contested.
    #[cfg_attr(feature = "serde", serde(rename = "GO_BACK"))]
    GoBack,
}

impl RecoveryAction {
    /// Stable tag name for logs and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryAction::Retry => "RETRY",
            RecoveryAction::CorrectInput => "CORRECT_INPUT",
            RecoveryAction::RequestAccess => "REQUEST_ACCESS",
            RecoveryAction::WaitAndRetry => "WAIT_AND_RETRY",
            RecoveryAction::Refresh => "REFRESH_PAGE",
            RecoveryAction::ContactSupport => "CONTACT_SUPPORT",
            RecoveryAction::GoBack => "GO_BACK",
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
