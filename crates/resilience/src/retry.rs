use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Bounded exponential-backoff retry with jitter, matching
/// `utils/retry_helper.py::RetryHelper`'s delay formula exactly:
/// `delay_n = min(base * factor^(n-1), max_delay) * U(0.75, 1.25)`.
pub struct RetryHelper {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
}

impl RetryHelper {
    pub fn new(max_attempts: u32, base_delay_secs: f64, max_delay_secs: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs_f64(base_delay_secs),
            max_delay: Duration::from_secs_f64(max_delay_secs),
            exponential_base: 2.0,
            jitter: true,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let raw = self.base_delay.as_secs_f64() * self.exponential_base.powi(attempt as i32 - 1);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let jittered = if self.jitter {
            let factor = rand::thread_rng().gen_range(0.75..=1.25);
            capped * factor
        } else {
            capped
        };
        Duration::from_secs_f64(jittered.max(0.0))
    }

    /// Runs `f`, retrying while `is_retryable` returns true for the
    /// error and attempts remain. The last error is returned on
    /// exhaustion; a non-retryable error propagates immediately.
    pub async fn run<F, Fut, T, E>(&self, mut f: F, is_retryable: impl Fn(&E) -> bool) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    tracing::warn!(attempt, max = self.max_attempts, ?delay, "retrying after failure");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
