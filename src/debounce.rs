//! Call pacing: trailing-edge debounce and leading-edge throttle.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

/// Trailing-edge debouncer: runs an action after a quiet period, and a
/// newer call supersedes any action still waiting.
///
/// # Examples
///
/// ```rust
/// use backstop::Debouncer;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let debouncer = Debouncer::new(Duration::from_millis(10));
/// let fired = Arc::new(AtomicU32::new(0));
///
/// for _ in 0..3 {
///     let fired = fired.clone();
///     debouncer.call(async move {
///         fired.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// tokio::time::sleep(Duration::from_millis(50)).await;
/// assert_eq!(fired.load(Ordering::SeqCst), 1); // only the last call ran
/// # });
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    scheduled: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            scheduled: Mutex::new(None),
        }
    }

    /// Schedule `action` to run after the quiet period, aborting any
    /// previously scheduled action that hasn't run yet.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut slot = self.scheduled.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Abort the scheduled action, if any hasn't run yet.
    pub fn cancel(&self) {
        let mut slot = self.scheduled.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// Whether an action is scheduled and still waiting (or running).
    pub fn is_pending(&self) -> bool {
        let slot = self.scheduled.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|handle| !handle.is_finished()).unwrap_or(false)
    }
}

/// Leading-edge throttle: admits at most one call per interval.
///
/// Unlike [`Debouncer`] this runs nothing itself -- it is a gate the
/// caller consults before doing the work.
///
/// # Examples
///
/// ```rust
/// use backstop::Throttle;
/// use std::time::Duration;
///
/// let throttle = Throttle::new(Duration::from_secs(60));
/// assert!(throttle.allow());
/// assert!(!throttle.allow()); // within the interval
/// ```
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Create a throttle with the given minimum interval between calls.
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Admit the call if the interval has elapsed since the last
    /// admission, recording the admission time.
    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(stamp) if now.duration_since(stamp) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
