/*!
 * Resilience wrapper around external provider calls.
 *
 * Every call made by a translation strategy goes through a `ResiliencePolicy`:
 * - `retry`: attempts with capped exponential backoff, transient errors only
 * - `circuit_breaker`: failure-rate breaker shared by all calls to one provider
 * - a per-call timeout, so one slow item cannot stall its batch
 *
 * Retry is the outer loop. Each attempt asks the breaker for permission and
 * reports its outcome, so an outage opens the breaker during retries and the
 * remaining attempts are skipped.
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::app_config::ResilienceConfig;
use crate::errors::{ProviderError, TranslationError};

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitEvent, CircuitState};
pub use retry::{is_transient, RetryPolicy};

/// Retry, timeout and circuit breaker for one collaborator
#[derive(Debug, Clone)]
pub struct ResiliencePolicy {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
    call_timeout: Duration,
}

impl ResiliencePolicy {
    pub fn new(retry: RetryPolicy, breaker: Arc<CircuitBreaker>, call_timeout: Duration) -> Self {
        Self {
            retry,
            breaker,
            call_timeout,
        }
    }

    /// Build a policy with its own breaker named after the collaborator
    pub fn from_config(name: &str, config: &ResilienceConfig) -> Self {
        let retry = RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
        );
        let breaker = CircuitBreaker::new(
            name,
            CircuitBreakerConfig {
                failure_rate_threshold: config.failure_rate_threshold,
                window_size: config.window_size,
                minimum_calls: config.minimum_calls,
                open_duration: Duration::from_secs(config.open_duration_secs),
                half_open_max_calls: config.half_open_max_calls,
            },
        );
        Self::new(
            retry,
            Arc::new(breaker),
            Duration::from_secs(config.call_timeout_secs),
        )
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run `op` under the policy.
    ///
    /// `op` is invoked once per attempt. The error is a `TranslationFailure`
    /// when the breaker rejects the call or the attempts are used up.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if !self.breaker.try_acquire() {
                warn!(
                    "Circuit breaker '{}' is open, skipping call (attempt {})",
                    self.breaker.name(),
                    attempt
                );
                return Err(TranslationError::failure_msg(format!(
                    "circuit breaker '{}' open",
                    self.breaker.name()
                )));
            }

            let outcome = match tokio::time::timeout(self.call_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.call_timeout.as_millis() as u64)),
            };

            match outcome {
                Ok(value) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Err(error) => {
                    self.breaker.record_failure();
                    if !self.retry.should_retry(attempt, &error) {
                        return Err(TranslationError::failure(
                            format!(
                                "'{}' call failed after {} attempt(s)",
                                self.breaker.name(),
                                attempt
                            ),
                            error,
                        ));
                    }
                    let delay = self.retry.delay(attempt);
                    debug!(
                        "'{}' attempt {}/{} failed: {}. Retrying in {:?}",
                        self.breaker.name(),
                        attempt,
                        self.retry.max_attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
