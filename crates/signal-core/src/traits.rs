use crate::{BarSeries, Error};
use async_trait::async_trait;
use chrono::NaiveDate;

/// An adapter bringing bars from one external data source to the
/// normalized schema. `fetch_raw`/`normalize` are the only two
/// extension points; `clean`/`compute_indicators` are shared logic the
/// base `get_daily` template applies to every source.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &str;

    /// Lower is preferred by the fetch manager.
    fn priority(&self) -> i32;

    async fn fetch_raw(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<serde_json::Value, Error>;

    fn normalize(&self, raw: serde_json::Value, symbol: &str) -> Result<BarSeries, Error>;
}

/// One delivery target. `send` never panics on transport failure; it
/// reports success as a boolean so the fan-out can tolerate partial
/// failure.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, content: &str) -> bool;
}
