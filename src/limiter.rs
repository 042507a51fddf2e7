//! Sliding-window rate limiting.
//!
//! An explicit struct with constructor-injected configuration -- there is
//! deliberately no global instance, so tests and independent subsystems
//! each build their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::classify::Diagnose;

/// Sliding-window rate limiter keyed by caller-chosen identifiers.
///
/// Each key keeps a log of admission times inside the current window;
/// a call is admitted while the log holds fewer than `max_requests`
/// entries. Internally synchronized, so one limiter can be shared by
/// reference across tasks.
///
/// # Examples
///
/// ```rust
/// use backstop::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
///
/// assert!(limiter.try_acquire("user-1").is_ok());
/// assert!(limiter.try_acquire("user-1").is_ok());
/// assert!(limiter.try_acquire("user-1").is_err()); // window full
/// assert!(limiter.try_acquire("user-2").is_ok());  // keys are independent
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` calls per `window` per key.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        RateLimiter {
            max_requests,
            window,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Admit a call under `key`, or fail with the wait until a slot frees.
    pub fn try_acquire(&self, key: &str) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());

        let log = requests.entry(key.to_string()).or_default();
        log.retain(|stamp| now.duration_since(*stamp) < self.window);

        if log.len() >= self.max_requests {
            // The oldest in-window admission determines when a slot frees.
            let retry_after = log
                .first()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                key,
                in_window = log.len(),
                max_requests = self.max_requests,
                "rate limit exceeded"
            );
            return Err(RateLimitExceeded { retry_after });
        }

        log.push(now);
        Ok(())
    }

    /// Number of admissions currently inside `key`'s window.
    pub fn count(&self, key: &str) -> usize {
        let now = Instant::now();
        let requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        requests
            .get(key)
            .map(|log| {
                log.iter()
                    .filter(|stamp| now.duration_since(**stamp) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drop expired admissions and forget keys with empty windows.
    pub fn purge(&self) {
        let now = Instant::now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        requests.retain(|_, log| {
            log.retain(|stamp| now.duration_since(*stamp) < self.window);
            !log.is_empty()
        });
    }
}

/// Returned when a key's window is full.
///
/// Classifies as a rate-limit failure (status 429), so feeding it to the
/// [classifier](crate::classify()) yields `WaitAndRetry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitExceeded {
    /// Time until the oldest in-window admission expires.
    pub retry_after: Duration,
}

impl fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit exceeded, retry in {}s",
            self.retry_after.as_secs_f64().ceil() as u64
        )
    }
}

impl std::error::Error for RateLimitExceeded {}

impl Diagnose for RateLimitExceeded {
    fn message(&self) -> String {
        self.to_string()
    }

    fn status(&self) -> Option<u16> {
        Some(429)
    }
}
