//! The fixed-precedence rule table.
//!
//! Rule order is load-bearing: real failure text often contains vocabulary
//! from several categories ("network timeout" carries both a network and a
//! timeout marker), and callers depend on which rule wins. Connectivity is
//! checked first, then timeouts, then input validation, then the
//! status-code-backed categories. Do not reorder.

use std::borrow::Cow;

use super::{Classification, ErrorCategory, RecoveryAction};

const NETWORK_MARKERS: &[&str] = &["network", "fetch", "connection", "offline"];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const VALIDATION_MARKERS: &[&str] = &["invalid", "validation", "required", "must be"];
const PERMISSION_MARKERS: &[&str] = &["permission", "unauthorized", "forbidden", "access denied"];
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "too many requests"];
const NOT_FOUND_MARKERS: &[&str] = &["not found", "does not exist"];
const CONFLICT_MARKERS: &[&str] = &["conflict", "already exists"];

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// Run the rule table over a failure's normalized facets.
///
/// `message` and `name` are already lower-cased; `original` is the
/// message in its original casing, kept so validation failures can show
/// the producer's own wording.
pub(super) fn match_rules(
    message: &str,
    name: Option<&str>,
    status: Option<u16>,
    original: &str,
) -> Classification {
    if name == Some("networkerror") || contains_any(message, NETWORK_MARKERS) {
        return Classification {
            category: ErrorCategory::Network,
            recoverable: true,
            retryable: true,
            user_message: Cow::Borrowed(
                "Network connection issue. Please check your internet connection and try again.",
            ),
            action: RecoveryAction::Retry,
        };
    }

    if contains_any(message, TIMEOUT_MARKERS) {
        return Classification {
            category: ErrorCategory::Timeout,
            recoverable: true,
            retryable: true,
            user_message: Cow::Borrowed(
                "Request timed out. The operation took too long to complete.",
            ),
            action: RecoveryAction::Retry,
        };
    }

    if name == Some("validationerror") || contains_any(message, VALIDATION_MARKERS) {
        // Re-running an invalid request repeats the same failure, so the
        // category is recoverable (fix the input) but never retryable.
        let user_message = if original.is_empty() {
            Cow::Borrowed("Invalid input. Please check your data and try again.")
        } else {
            Cow::Owned(original.to_string())
        };
        return Classification {
            category: ErrorCategory::Validation,
            recoverable: true,
            retryable: false,
            user_message,
            action: RecoveryAction::CorrectInput,
        };
    }

    if contains_any(message, PERMISSION_MARKERS) || matches!(status, Some(401) | Some(403)) {
        return Classification {
            category: ErrorCategory::Permission,
            recoverable: false,
            retryable: false,
            user_message: Cow::Borrowed(
                "You don't have permission for this action. Please check your access rights.",
            ),
            action: RecoveryAction::RequestAccess,
        };
    }

    if contains_any(message, RATE_LIMIT_MARKERS) || status == Some(429) {
        return Classification {
            category: ErrorCategory::RateLimit,
            recoverable: true,
            retryable: true,
            user_message: Cow::Borrowed("Too many requests. Please wait a moment and try again."),
            action: RecoveryAction::WaitAndRetry,
        };
    }

    if contains_any(message, NOT_FOUND_MARKERS) || status == Some(404) {
        return Classification {
            category: ErrorCategory::NotFound,
            recoverable: false,
            retryable: false,
            user_message: Cow::Borrowed("The requested resource was not found."),
            action: RecoveryAction::GoBack,
        };
    }

    if contains_any(message, CONFLICT_MARKERS) || status == Some(409) {
        return Classification {
            category: ErrorCategory::Conflict,
            recoverable: false,
            retryable: false,
            user_message: Cow::Borrowed("A conflict occurred. The resource may already exist."),
            action: RecoveryAction::GoBack,
        };
    }

    Classification {
        category: ErrorCategory::Unknown,
        recoverable: false,
        retryable: false,
        user_message: Cow::Borrowed(
            "An unexpected error occurred. Please try again or contact support.",
        ),
        action: RecoveryAction::ContactSupport,
    }
}
