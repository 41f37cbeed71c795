/// Bounded exponential-backoff retry
///
/// Wraps a single-attempt operation: attempt 1 runs immediately, each failed
/// attempt n < max waits `base_delay * 2^(n-1)` before the next. Rate-limit
/// and transient failures are retried identically; once the budget is spent
/// the last failure is folded into `Exhausted`.
use crate::errors::{FetchError, FetchResult};
use crate::logger::{self, LogTag};
use std::future::Future;
use std::time::Duration;

/// Backoff growth stops doubling past this exponent
const MAX_BACKOFF_SHIFT: u32 = 10;

/// Hard ceiling on a single backoff wait
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            // A zero budget would never dispatch at all
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay scheduled after failed attempt `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        let delay = self.base_delay * 2u32.saturating_pow(shift);
        delay.min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds, fails non-retryably, or the attempt
    /// budget is spent.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> FetchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    logger::warning(
                        LogTag::Queue,
                        &format!(
                            "Attempt {}/{} failed ({}), retrying in {} ms",
                            attempt,
                            self.max_attempts,
                            err,
                            delay.as_millis()
                        ),
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    return Err(FetchError::Exhausted {
                        attempts: self.max_attempts,
                        last_error: err.to_string(),
                    });
                }
                // Terminal failures (cancelled, disabled) are not retried
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn succeeds_first_try_without_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));

        let start = Instant::now();
        let result: FetchResult<Value> = policy.run(|| async { Ok(json!("ok")) }).await;

        assert_eq!(result.unwrap(), json!("ok"));
        assert!(start.elapsed() < Duration::from_millis(30));
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds_with_growing_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(40));
        let attempts = Arc::new(AtomicU32::new(0));
        let timestamps: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let result: FetchResult<Value> = policy
            .run(|| {
                let attempts = Arc::clone(&attempts);
                let timestamps = Arc::clone(&timestamps);
                async move {
                    timestamps.lock().await.push(Instant::now());
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(FetchError::Transient("upstream hiccup".to_string()))
                    } else {
                        Ok(json!([1, 2, 3]))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), json!([1, 2, 3]));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        // Exactly two waits, the second twice the first
        let stamps = timestamps.lock().await;
        assert_eq!(stamps.len(), 3);
        let gap1 = stamps[1] - stamps[0];
        let gap2 = stamps[2] - stamps[1];
        assert!(gap1 >= Duration::from_millis(40));
        assert!(gap2 >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn exhaustion_carries_attempts_and_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: FetchResult<Value> = policy
            .run(|| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(FetchError::RateLimited)
                }
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(FetchError::Exhausted { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("429"));
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rate_limited_and_transient_retry_identically() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: FetchResult<Value> = policy
            .run(|| {
                let attempts = Arc::clone(&attempts);
                async move {
                    match attempts.fetch_add(1, Ordering::SeqCst) {
                        0 => Err(FetchError::RateLimited),
                        1 => Err(FetchError::Transient("HTTP 502".to_string())),
                        _ => Ok(json!("recovered")),
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), json!("recovered"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_failure_is_not_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: FetchResult<Value> = policy
            .run(|| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(FetchError::Cancelled)
                }
            })
            .await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_attempt_budget_fails_fast() {
        let policy = RetryPolicy::new(1, Duration::from_millis(100));
        assert_eq!(policy.max_attempts(), 1);
        // A zero budget is clamped up to one attempt
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);

        let start = Instant::now();
        let result: FetchResult<Value> = policy
            .run(|| async { Err(FetchError::Transient("boom".to_string())) })
            .await;

        assert!(matches!(result, Err(FetchError::Exhausted { attempts: 1, .. })));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn delay_schedule_doubles_and_caps() {
        let policy = RetryPolicy::new(3, Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(8000));

        let slow = RetryPolicy::new(30, Duration::from_secs(30));
        assert_eq!(slow.delay_for_attempt(20), MAX_BACKOFF);
    }
}
