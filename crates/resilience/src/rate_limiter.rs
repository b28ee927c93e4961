use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct SourceState {
    /// Sliding window of call timestamps, used only when a
    /// requests-per-minute quota is configured for this source.
    window: VecDeque<Instant>,
    last_call: Option<Instant>,
}

impl SourceState {
    fn new() -> Self {
        Self {
            window: VecDeque::new(),
            last_call: None,
        }
    }
}

/// Per-source uniform-random sleep plus an optional token-bucket quota.
///
/// `pace(source_id)` blocks the caller until the bucket (if any) admits
/// one token AND at least `min_s` has elapsed since the last call from
/// that source. Grounded on `polygon-client`'s sliding-window limiter,
/// generalized to track one window per named source instead of one
/// global window.
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    requests_per_minute: Option<u32>,
    sources: Mutex<HashMap<String, SourceState>>,
}

impl RateLimiter {
    pub fn new(min_s: f64, max_s: f64, requests_per_minute: Option<u32>) -> Self {
        Self {
            min_delay: Duration::from_secs_f64(min_s.max(0.0)),
            max_delay: Duration::from_secs_f64(max_s.max(min_s).max(0.0)),
            requests_per_minute,
            sources: Mutex::new(HashMap::new()),
        }
    }

    pub async fn pace(&self, source_id: &str) {
        self.wait_for_quota(source_id).await;
        self.wait_for_jitter(source_id).await;

        let mut sources = self.sources.lock().await;
        let state = sources
            .entry(source_id.to_string())
            .or_insert_with(SourceState::new);
        state.last_call = Some(Instant::now());
        if self.requests_per_minute.is_some() {
            state.window.push_back(Instant::now());
        }
    }

    async fn wait_for_jitter(&self, source_id: &str) {
        let last_call = {
            let sources = self.sources.lock().await;
            sources.get(source_id).and_then(|s| s.last_call)
        };

        let target_delay = if self.max_delay > self.min_delay {
            let jitter_range = (self.max_delay - self.min_delay).as_secs_f64();
            let extra = rand::thread_rng().gen_range(0.0..=jitter_range);
            self.min_delay + Duration::from_secs_f64(extra)
        } else {
            self.min_delay
        };

        if let Some(last) = last_call {
            let elapsed = last.elapsed();
            if elapsed < target_delay {
                sleep(target_delay - elapsed).await;
            }
        }
    }

    async fn wait_for_quota(&self, source_id: &str) {
        let Some(limit) = self.requests_per_minute else {
            return;
        };

        loop {
            let wait = {
                let mut sources = self.sources.lock().await;
                let state = sources
                    .entry(source_id.to_string())
                    .or_insert_with(SourceState::new);

                let cutoff = Instant::now() - Duration::from_secs(60);
                while state.window.front().is_some_and(|t| *t < cutoff) {
                    state.window.pop_front();
                }

                if (state.window.len() as u32) < limit {
                    None
                } else {
                    state.window.front().map(|oldest| {
                        Duration::from_secs(60).saturating_sub(oldest.elapsed())
                    })
                }
            };

            match wait {
                None => return,
                Some(d) => sleep(d + Duration::from_millis(10)).await,
            }
        }
    }
}
