/*!
 * Tests for retry and circuit breaker behavior
 */

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use textbridge::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, ResiliencePolicy, RetryPolicy,
};
use textbridge::{ProviderError, TranslationError};

fn quick_breaker(minimum_calls: usize) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(
        "test",
        CircuitBreakerConfig {
            failure_rate_threshold: 0.5,
            window_size: 10,
            minimum_calls,
            open_duration: Duration::from_millis(30),
            half_open_max_calls: 1,
        },
    ))
}

fn server_error() -> ProviderError {
    ProviderError::ApiError {
        message: "unavailable".to_string(),
        status_code: 503,
    }
}

#[tokio::test]
async fn test_breaker_shouldRecordFullStateCycle() {
    let breaker = quick_breaker(2);
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(!breaker.try_acquire());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(breaker.try_acquire());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::Closed);

    let transitions: Vec<(CircuitState, CircuitState)> =
        breaker.events().iter().map(|e| (e.from, e.to)).collect();
    assert_eq!(
        transitions,
        vec![
            (CircuitState::Closed, CircuitState::Open),
            (CircuitState::Open, CircuitState::HalfOpen),
            (CircuitState::HalfOpen, CircuitState::Closed),
        ]
    );
}

#[tokio::test]
async fn test_breaker_withFailedTrialCall_shouldReopen() {
    let breaker = quick_breaker(1);
    breaker.record_failure();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(breaker.try_acquire());
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[test]
fn test_breaker_belowMinimumCalls_shouldStayClosed() {
    let breaker = quick_breaker(5);
    for _ in 0..4 {
        breaker.record_failure();
    }
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert!((breaker.failure_rate() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_policyCall_withTransientErrors_shouldRetryUntilSuccess() {
    let policy = ResiliencePolicy::new(
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2)),
        quick_breaker(10),
        Duration::from_secs(1),
    );
    let attempts = AtomicU32::new(0);

    let result = policy
        .call(|| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_policyCall_withPermanentError_shouldNotRetry() {
    let policy = ResiliencePolicy::new(
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2)),
        quick_breaker(10),
        Duration::from_secs(1),
    );
    let attempts = AtomicU32::new(0);

    let result: Result<(), TranslationError> = policy
        .call(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::AuthenticationError("bad key".to_string())) }
        })
        .await;

    assert!(matches!(result, Err(TranslationError::TranslationFailure { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_policyCall_whenBreakerOpensMidRetry_shouldSkipRemainingAttempts() {
    let policy = ResiliencePolicy::new(
        RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(2)),
        quick_breaker(2),
        Duration::from_secs(1),
    );
    let attempts = AtomicU32::new(0);

    let result: Result<(), TranslationError> = policy
        .call(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(policy.breaker().state(), CircuitState::Open);
}

#[tokio::test]
async fn test_policyCall_withSlowOperation_shouldTimeOut() {
    let policy = ResiliencePolicy::new(
        RetryPolicy::no_retry(),
        quick_breaker(10),
        Duration::from_millis(10),
    );

    let result = policy
        .call(|| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ProviderError>(())
        })
        .await;

    assert!(result.is_err());
}
