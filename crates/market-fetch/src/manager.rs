use crate::template::get_daily;
use chrono::NaiveDate;
use resilience::{CircuitBreaker, RetryHelper};
use signal_core::{BarSeries, Error, Fetcher};
use std::sync::Arc;
use std::time::Duration;

struct Slot {
    fetcher: Arc<dyn Fetcher>,
    breaker: CircuitBreaker,
    retry: RetryHelper,
}

/// Holds fetchers sorted ascending by priority and drives failover
/// across them, matching `analysis-orchestrator`'s engine-iteration
/// loop but for raw source fetch instead of analysis.
pub struct FetchManager {
    slots: Vec<Slot>,
}

impl FetchManager {
    pub fn new(fetchers: Vec<Arc<dyn Fetcher>>) -> Self {
        let mut fetchers = fetchers;
        fetchers.sort_by_key(|f| f.priority());
        let slots = fetchers
            .into_iter()
            .map(|fetcher| Slot {
                breaker: CircuitBreaker::new(fetcher.name().to_string(), 5, Duration::from_secs(300), 2),
                retry: RetryHelper::new(3, 1.0, 30.0),
                fetcher,
            })
            .collect();
        Self { slots }
    }

    /// Iterates fetchers in priority order, calling each through its
    /// retry helper and circuit breaker, returning the first non-empty
    /// success. Breakers left OPEN are skipped without invocation but
    /// remain eligible on the next call once their cooldown elapses.
    pub async fn get_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days: i64,
    ) -> (Option<BarSeries>, String) {
        let mut last_error: Option<Error> = None;

        for slot in &self.slots {
            let fetcher = slot.fetcher.clone();
            let name = fetcher.name().to_string();
            let symbol = symbol.to_string();

            let outcome = slot
                .breaker
                .call(|| {
                    let fetcher = fetcher.clone();
                    let symbol = symbol.clone();
                    async move {
                        slot.retry
                            .run(
                                || {
                                    let fetcher = fetcher.clone();
                                    let symbol = symbol.clone();
                                    async move { get_daily(fetcher.as_ref(), &symbol, start, end, days).await }
                                },
                                |e| !matches!(e, Error::InvalidData(_) | Error::Validation(_)),
                            )
                            .await
                    }
                })
                .await;

            match outcome {
                Err(open) => {
                    tracing::warn!(fetcher = %name, "breaker open, skipping: {open}");
                    continue;
                }
                Ok(Err(err)) => {
                    tracing::warn!(fetcher = %name, "fetch failed: {err}");
                    last_error = Some(err);
                    continue;
                }
                Ok(Ok(series)) if series.is_empty() => {
                    tracing::warn!(fetcher = %name, "fetch returned empty series");
                    continue;
                }
                Ok(Ok(series)) => return (Some(series), name),
            }
        }

        if let Some(err) = last_error {
            tracing::error!("all fetchers exhausted, last error: {err}");
        }
        (None, String::new())
    }
}
