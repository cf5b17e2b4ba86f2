//! Bounded retry policy for transient server errors

use std::time::Duration;

/// HTTP statuses meaning "temporarily unavailable"
pub const TRANSIENT_STATUSES: [u16; 3] = [502, 503, 504];

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Retry bound and backoff schedule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Returns true for statuses worth repeating the request for
    pub fn is_transient_status(&self, status: u16) -> bool {
        TRANSIENT_STATUSES.contains(&status)
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_transient_statuses() {
        let policy = RetryPolicy::default();
        assert!(policy.is_transient_status(503));
        assert!(policy.is_transient_status(502));
        assert!(policy.is_transient_status(504));
        assert!(!policy.is_transient_status(500));
        assert!(!policy.is_transient_status(401));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(30), MAX_BACKOFF);
    }

    proptest! {
        #[test]
        fn backoff_never_shrinks_or_exceeds_cap(base_ms in 1u64..5_000, attempt in 1u32..40) {
            let policy = RetryPolicy::new(3, Duration::from_millis(base_ms));
            let delay = policy.delay_for_attempt(attempt);
            prop_assert!(delay <= MAX_BACKOFF);
            prop_assert!(policy.delay_for_attempt(attempt + 1) >= delay);
        }

        #[test]
        fn only_gateway_statuses_are_transient(status in 100u16..600) {
            let transient = RetryPolicy::default().is_transient_status(status);
            prop_assert_eq!(transient, matches!(status, 502..=504));
        }
    }
}
