//! Retry policy configuration.

use std::time::Duration;

/// Fraction of the base delay that jitter may add on top.
///
/// Jitter is strictly additive: a delay of `d` becomes a uniform draw
/// from `[d, d + JITTER_FRACTION * d)`.
pub const JITTER_FRACTION: f64 = 0.3;

/// Exponential backoff policy for the retry executors.
///
/// Pure data -- a policy describes retry behavior but doesn't execute it,
/// so it is cheap to clone, compare, and inspect in tests. The attempt
/// budget is the *total* number of invocations: `with_max_retries(3)`
/// means the operation runs at most 3 times.
///
/// # Defaults
///
/// 3 attempts, 1s initial delay, factor 2, 30s delay ceiling.
///
/// # Examples
///
/// ```rust
/// use backstop::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(4)
///     .with_initial_delay(Duration::from_millis(100));
///
/// // Delays between the 4 attempts: 100ms, 200ms, 400ms.
/// assert_eq!(policy.delay_after_attempt(0), Some(Duration::from_millis(100)));
/// assert_eq!(policy.delay_after_attempt(1), Some(Duration::from_millis(200)));
/// assert_eq!(policy.delay_after_attempt(2), Some(Duration::from_millis(400)));
/// assert_eq!(policy.delay_after_attempt(3), None); // budget spent
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    backoff_factor: f64,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total attempt budget (initial attempt included).
    ///
    /// A budget of 0 behaves like 1: the operation always runs at least
    /// once.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, d: Duration) -> Self {
        self.initial_delay = d;
        self
    }

    /// Set the per-attempt delay multiplier. Clamped to `>= 1.0`.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
        self
    }

    /// Set the delay ceiling. The base delay never exceeds this value;
    /// jitter may add up to [`JITTER_FRACTION`] on top.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Get the total attempt budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Get the per-attempt delay multiplier.
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Get the delay ceiling.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after failed attempt `attempt` (0-indexed), or `None`
    /// when the budget is spent and the failure should propagate.
    ///
    /// The schedule is `initial * factor^attempt`, capped at the ceiling,
    /// so recorded delays are monotonically non-decreasing.
    pub fn delay_after_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_retries {
            return None;
        }

        let raw = self.initial_delay.as_secs_f64() * self.backoff_factor.powf(f64::from(attempt));
        let capped = raw.min(self.max_delay.as_secs_f64());
        Some(Duration::from_secs_f64(capped))
    }

    /// Add jitter to a base delay: a uniform extra in
    /// `[0, JITTER_FRACTION * delay)`.
    #[cfg(feature = "jitter")]
    pub fn jittered(&self, delay: Duration) -> Duration {
        use rand::Rng;

        let mut rng = rand::rng();
        let extra = delay.as_secs_f64() * rng.random_range(0.0..JITTER_FRACTION);
        delay + Duration::from_secs_f64(extra)
    }

    /// Without the `jitter` feature the delay passes through unchanged.
    #[cfg(not(feature = "jitter"))]
    pub fn jittered(&self, delay: Duration) -> Duration {
        delay
    }
}

/// Information about one absorbed failure, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Backoff wait that preceded the upcoming attempt (jitter included).
    pub delay: Duration,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}
