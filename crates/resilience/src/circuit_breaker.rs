use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Error)]
#[error("circuit '{name}' open, {remaining_secs:.1}s remaining")]
pub struct CircuitBreakerOpenError {
    pub name: String,
    pub remaining_secs: f64,
}

struct Inner {
    state: CircuitBreakerState,
    failure_count: u32,
    success_count: u32,
    half_open_calls: u32,
    last_failure: Option<Instant>,
}

/// Three-state guard around any fallible async call, one instance per
/// protected resource. Transition table matches
/// `utils/circuit_breaker.py::CircuitBreaker` exactly: CLOSED -> OPEN
/// at `failure_threshold` consecutive failures, OPEN -> HALF_OPEN after
/// `timeout` elapses, HALF_OPEN -> CLOSED after `half_open_max_calls`
/// consecutive successes, HALF_OPEN -> OPEN on any failure. A success
/// while CLOSED decays `failure_count` by one (floor zero).
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    timeout: Duration,
    half_open_max_calls: u32,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, failure_threshold: u32, timeout: Duration, half_open_max_calls: u32) -> Self {
        Self {
            name: name.into(),
            failure_threshold,
            timeout,
            half_open_max_calls,
            inner: Mutex::new(Inner {
                state: CircuitBreakerState::Closed,
                failure_count: 0,
                success_count: 0,
                half_open_calls: 0,
                last_failure: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitBreakerState {
        self.inner.lock().unwrap().state
    }

    /// Runs `f` if the circuit admits a call, recording success/failure
    /// against `is_ok`. Returns `Err(CircuitBreakerOpenError)` without
    /// invoking `f` when the circuit is OPEN and the cooldown has not
    /// elapsed.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<Result<T, E>, CircuitBreakerOpenError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit()?;
        let result = f().await;
        match &result {
            Ok(_) => self.on_success(),
            Err(_) => self.on_failure(),
        }
        Ok(result)
    }

    fn admit(&self) -> Result<(), CircuitBreakerOpenError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == CircuitBreakerState::Open {
            let elapsed = inner.last_failure.map(|t| t.elapsed()).unwrap_or(Duration::MAX);
            if elapsed >= self.timeout {
                inner.state = CircuitBreakerState::HalfOpen;
                inner.half_open_calls = 0;
                tracing::info!(circuit = %self.name, "entering half-open");
            } else {
                let remaining = self.timeout.saturating_sub(elapsed);
                return Err(CircuitBreakerOpenError {
                    name: self.name.clone(),
                    remaining_secs: remaining.as_secs_f64(),
                });
            }
        }
        Ok(())
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.success_count += 1;
        match inner.state {
            CircuitBreakerState::HalfOpen => {
                inner.half_open_calls += 1;
                if inner.half_open_calls >= self.half_open_max_calls {
                    inner.state = CircuitBreakerState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    tracing::info!(circuit = %self.name, "closed");
                }
            }
            CircuitBreakerState::Closed => {
                inner.failure_count = inner.failure_count.saturating_sub(1);
            }
            CircuitBreakerState::Open => {}
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failure_count += 1;
        inner.last_failure = Some(Instant::now());

        match inner.state {
            CircuitBreakerState::HalfOpen => {
                inner.state = CircuitBreakerState::Open;
                tracing::warn!(circuit = %self.name, "half-open probe failed, reopening");
            }
            CircuitBreakerState::Closed => {
                if inner.failure_count >= self.failure_threshold {
                    inner.state = CircuitBreakerState::Open;
                    tracing::error!(circuit = %self.name, failures = inner.failure_count, "opened");
                }
            }
            CircuitBreakerState::Open => {}
        }
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = CircuitBreakerState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.half_open_calls = 0;
        inner.last_failure = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let cb = CircuitBreaker::new("test", 3, Duration::from_secs(60), 2);
        for _ in 0..3 {
            let _ = cb.call(|| async { Err::<(), _>("boom") }).await;
        }
        assert_eq!(cb.state(), CircuitBreakerState::Open);

        let result = cb.call(|| async { Ok::<_, &str>(()) }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn half_open_failure_reopens_immediately() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(10), 2);
        let _ = cb.call(|| async { Err::<(), _>("boom") }).await;
        assert_eq!(cb.state(), CircuitBreakerState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = cb.call(|| async { Err::<(), _>("still broken") }).await;
        assert_eq!(cb.state(), CircuitBreakerState::Open);
    }

    #[tokio::test]
    async fn half_open_closes_after_enough_successes() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(10), 2);
        let _ = cb.call(|| async { Err::<(), _>("boom") }).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let _ = cb.call(|| async { Ok::<_, &str>(()) }).await;
        assert_eq!(cb.state(), CircuitBreakerState::HalfOpen);
        let _ = cb.call(|| async { Ok::<_, &str>(()) }).await;
        assert_eq!(cb.state(), CircuitBreakerState::Closed);
    }
}
