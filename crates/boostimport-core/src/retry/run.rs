//! Async retry loop: run an operation until success or the policy says stop.

use std::fmt::Display;
use std::future::Future;

use super::policy::{RetryDecision, RetryPolicy};

/// Runs `op` until it succeeds or the retry policy gives up, sleeping the
/// backoff delay between attempts. `op` receives the 1-based attempt number.
/// Returns the last error when attempts are exhausted.
pub async fn run_with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_secs = d.as_secs(),
                        "attempt failed, retrying: {:#}",
                        e
                    );
                    tokio::time::sleep(d).await;
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let res: Result<(), String> = run_with_retry(&fast(4), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;
        assert_eq!(res.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let res: Result<u32, String> = run_with_retry(&fast(5), |attempt| async move {
            if attempt < 3 {
                Err(format!("attempt {}", attempt))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(res.unwrap(), 3);
    }
}
