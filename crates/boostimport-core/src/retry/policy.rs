use std::time::Duration;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; surface the last error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff with a floor and a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_retries(3)
    }
}

impl RetryPolicy {
    /// Download policy: `retries` retries after the first attempt, waiting
    /// 5 minutes, then 10, 20, 40, and 60 minutes thereafter.
    pub fn for_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            base_delay: Duration::from_secs(5 * 60),
            max_delay: Duration::from_secs(60 * 60),
        }
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(p: &RetryPolicy, attempt: u32) -> Duration {
        match p.decide(attempt) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry after attempt {}", attempt),
        }
    }

    #[test]
    fn download_backoff_floor_and_ceiling() {
        let p = RetryPolicy::for_retries(10);
        assert_eq!(delay(&p, 1), Duration::from_secs(300));
        assert_eq!(delay(&p, 2), Duration::from_secs(600));
        assert_eq!(delay(&p, 3), Duration::from_secs(1200));
        assert_eq!(delay(&p, 4), Duration::from_secs(2400));
        assert_eq!(delay(&p, 5), Duration::from_secs(3600));
        assert_eq!(delay(&p, 9), Duration::from_secs(3600));
    }

    #[test]
    fn retries_plus_one_attempts() {
        let p = RetryPolicy::for_retries(2);
        assert_eq!(p.max_attempts, 3);
        assert!(matches!(p.decide(1), RetryDecision::RetryAfter(_)));
        assert!(matches!(p.decide(2), RetryDecision::RetryAfter(_)));
        assert_eq!(p.decide(3), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let p = RetryPolicy::for_retries(0);
        assert_eq!(p.decide(1), RetryDecision::NoRetry);
    }
}
