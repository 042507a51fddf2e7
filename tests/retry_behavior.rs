//! End-to-end scenarios through the public API: classifier, retry
//! executors, timeout wrapper, and rate limiter working together.

use backstop::{
    classify, retry, retry_with_hooks, with_timeout, Batcher, ErrorCategory, ErrorReport,
    RateLimiter, RecoveryAction, RetryPolicy,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_initial_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn remote_failures_retry_until_the_service_recovers() {
    let attempts = AtomicU32::new(0);

    let result = retry(&fast_policy(5), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(ErrorReport::new("too many requests").with_status(429))
            } else {
                Ok("proposal accepted")
            }
        }
    })
    .await;

    assert_eq!(result, Ok("proposal accepted"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn permission_failures_cut_the_run_short() {
    let attempts = AtomicU32::new(0);
    let denied = ErrorReport::new("caller is not a council member").with_status(403);

    let result: Result<(), _> = retry(&fast_policy(10), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        let err = denied.clone();
        async move { Err(err) }
    })
    .await;

    // One invocation, and the caller gets the original report back.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(result, Err(denied));
}

#[tokio::test]
async fn exhausted_runs_surface_the_final_error() {
    let attempts = AtomicU32::new(0);

    let result: Result<(), _> = retry(&fast_policy(3), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move { Err(ErrorReport::new(format!("connection dropped on attempt {n}"))) }
    })
    .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let err = result.unwrap_err();
    assert_eq!(err, ErrorReport::new("connection dropped on attempt 2"));
}

#[tokio::test]
async fn timeouts_inside_an_operation_are_retried() {
    let attempts = AtomicU32::new(0);

    let result = retry(&fast_policy(5), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            with_timeout(Duration::from_millis(10), async move {
                if n < 2 {
                    // Stalls past the deadline on the first two attempts.
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
                Ok::<_, String>("fresh quote")
            })
            .await
        }
    })
    .await;

    assert_eq!(result, Ok("fresh quote"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn hook_observes_the_classified_run() {
    let attempts = AtomicU32::new(0);
    let observed = std::sync::Mutex::new(Vec::new());

    let result: Result<&str, &str> = retry_with_hooks(
        &fast_policy(4),
        || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { if n < 1 { Err("gateway timeout") } else { Ok("ok") } }
        },
        |event| {
            observed
                .lock()
                .unwrap()
                .push((event.attempt, event.error.to_string()));
            Ok(())
        },
    )
    .await;

    assert_eq!(result, Ok("ok"));
    assert_eq!(
        *observed.lock().unwrap(),
        vec![(1, "gateway timeout".to_string())]
    );
}

#[test]
fn rate_limit_errors_suggest_waiting() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    limiter.try_acquire("treasury").unwrap();

    let err = limiter.try_acquire("treasury").unwrap_err();
    let c = classify(&err);

    assert_eq!(c.category, ErrorCategory::RateLimit);
    assert_eq!(c.action, RecoveryAction::WaitAndRetry);
    assert!(c.retryable);
}

#[tokio::test]
async fn batched_calls_share_a_window() {
    let batcher: Batcher<u64, String> = Batcher::new(Duration::from_millis(5));

    let (balance, quote) = tokio::join!(
        batcher.submit("ledger", async { Ok(1_000) }),
        batcher.submit("ledger", async { Ok(42) }),
    );

    assert_eq!(balance, Ok(1_000));
    assert_eq!(quote, Ok(42));
    assert_eq!(batcher.pending_count(), 0);
}
