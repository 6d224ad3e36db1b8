/*!
 * Failure-rate circuit breaker.
 *
 * Outcomes of the most recent calls are kept in a sliding window. Once the
 * window holds at least `minimum_calls` outcomes and the failure rate reaches
 * the threshold, the breaker opens and rejects calls for `open_duration`.
 * It then admits up to `half_open_max_calls` trial calls: if they all succeed the
 * breaker closes, a single failed trial call opens it again.
 *
 * Every state change is recorded as a `CircuitEvent`.
 */

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::Mutex;

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        write!(f, "{}", name)
    }
}

/// A recorded state transition
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitEvent {
    pub from: CircuitState,
    pub to: CircuitState,
    pub at: DateTime<Utc>,
}

/// Breaker thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure rate in (0, 1] that opens the breaker
    pub failure_rate_threshold: f64,
    /// Outcomes kept in the sliding window
    pub window_size: usize,
    /// Outcomes required before the rate is evaluated
    pub minimum_calls: usize,
    /// Time spent open before probing
    pub open_duration: Duration,
    /// Trial calls admitted while half-open
    pub half_open_max_calls: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            window_size: 20,
            minimum_calls: 5,
            open_duration: Duration::from_secs(30),
            half_open_max_calls: 1,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    /// true = failure
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_in_flight: usize,
    half_open_successes: usize,
    events: Vec<CircuitEvent>,
}

impl BreakerState {
    fn transition(&mut self, name: &str, to: CircuitState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        match to {
            CircuitState::Open => {
                self.opened_at = Some(Instant::now());
                warn!("Circuit breaker '{}' {} -> {}", name, from, to);
            }
            CircuitState::HalfOpen => {
                self.half_open_in_flight = 0;
                self.half_open_successes = 0;
                info!("Circuit breaker '{}' {} -> {}", name, from, to);
            }
            CircuitState::Closed => {
                self.window.clear();
                self.opened_at = None;
                info!("Circuit breaker '{}' {} -> {}", name, from, to);
            }
        }
        self.events.push(CircuitEvent {
            from,
            to,
            at: Utc::now(),
        });
    }

    fn failure_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let failures = self.window.iter().filter(|failed| **failed).count();
        failures as f64 / self.window.len() as f64
    }
}

/// Circuit breaker shared by every call to one provider
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                half_open_in_flight: 0,
                half_open_successes: 0,
                events: Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, moving from open to half-open when the open period is over
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        inner.state
    }

    /// Ask for permission to call; every granted call must be followed by
    /// `record_success` or `record_failure`
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight < self.config.half_open_max_calls.max(1) {
                    inner.half_open_in_flight += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => self.push_outcome(&mut inner, false),
            CircuitState::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.half_open_max_calls.max(1) {
                    inner.transition(&self.name, CircuitState::Closed);
                }
            }
            // Late result of a call admitted before the breaker opened
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => self.push_outcome(&mut inner, true),
            CircuitState::HalfOpen => inner.transition(&self.name, CircuitState::Open),
            CircuitState::Open => {}
        }
    }

    /// Failure rate over the current window
    pub fn failure_rate(&self) -> f64 {
        self.inner.lock().failure_rate()
    }

    /// State transitions so far, oldest first
    pub fn events(&self) -> Vec<CircuitEvent> {
        self.inner.lock().events.clone()
    }

    /// Force the breaker back to closed
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.transition(&self.name, CircuitState::Closed);
        inner.window.clear();
    }

    /// Record a closed-state outcome and open once the window crosses the threshold
    fn push_outcome(&self, inner: &mut BreakerState, failed: bool) {
        inner.window.push_back(failed);
        while inner.window.len() > self.config.window_size.max(1) {
            inner.window.pop_front();
        }
        if inner.window.len() >= self.config.minimum_calls
            && inner.failure_rate() >= self.config.failure_rate_threshold
        {
            inner.transition(&self.name, CircuitState::Open);
        }
    }

    fn refresh(&self, inner: &mut BreakerState) {
        if inner.state == CircuitState::Open
            && inner
                .opened_at
                .is_some_and(|opened| opened.elapsed() >= self.config.open_duration)
        {
            inner.transition(&self.name, CircuitState::HalfOpen);
        }
    }
}
