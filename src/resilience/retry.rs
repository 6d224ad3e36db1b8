/*!
 * Retry policy with capped exponential backoff.
 */

use std::time::Duration;

use crate::errors::ProviderError;

/// How many times a provider call is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one; never below 1
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub backoff_base: Duration,
    /// Upper bound for a single wait
    pub backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration, backoff_max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_max,
        }
    }

    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let base_ms = self.backoff_base.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay_ms).min(self.backoff_max)
    }

    /// Whether another attempt may follow failed attempt number `attempt`
    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        attempt < self.max_attempts && is_transient(error)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(8))
    }
}

/// Whether an error may go away on its own
pub fn is_transient(error: &ProviderError) -> bool {
    match error {
        ProviderError::AuthenticationError(_)
        | ProviderError::Unsupported(_)
        | ProviderError::ParseError(_) => false,
        ProviderError::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 408,
        ProviderError::RequestFailed(_)
        | ProviderError::ConnectionError(_)
        | ProviderError::RateLimitExceeded(_)
        | ProviderError::Timeout(_) => true,
    }
}
