use chrono::{Duration, NaiveDate, Utc};
use signal_core::{BarSeries, Error, Fetcher};
use technical_indicators::{atr, macd, rsi, sma, volume_ratio};

/// Default window: `end = today`, `start = end - 2*days` when either
/// bound is absent, matching `get_daily`'s default-range rule.
fn resolve_range(start: Option<NaiveDate>, end: Option<NaiveDate>, days: i64) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let start = start.unwrap_or_else(|| end - Duration::days(2 * days));
    (start, end)
}

/// Drops rows with a non-finite close or negative volume, then sorts
/// ascending by date. The only shared cleaning step every fetcher goes
/// through regardless of source.
fn clean(mut series: BarSeries) -> BarSeries {
    series.bars.retain(|b| b.close.is_finite() && b.volume.is_finite() && b.volume >= 0.0);
    series.bars.sort_by_key(|b| b.date);
    series
}

/// Fills every bar's derived-indicator fields from the cleaned close/
/// high/low/volume arrays. Pure function of the series; never touches
/// network or disk.
fn compute_indicators(mut series: BarSeries) -> BarSeries {
    let closes = series.closes();
    let highs = series.highs();
    let lows = series.lows();
    let volumes = series.volumes();

    let ma5 = sma(&closes, 5);
    let ma10 = sma(&closes, 10);
    let ma20 = sma(&closes, 20);
    let vr = volume_ratio(&volumes);
    let macd_result = macd(&closes);
    let rsi_values = rsi(&closes, 14);
    let atr_values = atr(&highs, &lows, &closes, 14);

    for (i, bar) in series.bars.iter_mut().enumerate() {
        bar.ma5 = ma5.get(i).copied();
        bar.ma10 = ma10.get(i).copied();
        bar.ma20 = ma20.get(i).copied();
        bar.volume_ratio = vr.get(i).copied();
        bar.macd = macd_result.macd.get(i).copied();
        bar.macd_signal = macd_result.signal.get(i).copied();
        bar.macd_hist = macd_result.hist.get(i).copied();
        bar.rsi = rsi_values.get(i).copied();
        bar.atr = atr_values.get(i).copied();
    }
    series
}

/// Base template method every concrete fetcher runs through:
/// `fetch_raw` -> `normalize` -> `clean` -> `compute_indicators`. Fails
/// with `Error::Fetch` wrapping the cause if any step yields an empty
/// series.
pub async fn get_daily(
    fetcher: &dyn Fetcher,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: i64,
) -> Result<BarSeries, Error> {
    let (start, end) = resolve_range(start, end, days);
    let raw = fetcher.fetch_raw(symbol, start, end).await?;
    let normalized = fetcher.normalize(raw, symbol)?;
    if normalized.is_empty() {
        return Err(Error::Fetch(format!("{}: normalize produced no rows for {symbol}", fetcher.name())));
    }
    let cleaned = clean(normalized);
    if cleaned.is_empty() {
        return Err(Error::Fetch(format!("{}: no rows survived cleaning for {symbol}", fetcher.name())));
    }
    Ok(compute_indicators(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signal_core::Bar;

    struct FakeFetcher {
        rows: Vec<(NaiveDate, f64, f64)>,
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        fn name(&self) -> &str {
            "fake"
        }

        fn priority(&self) -> i32 {
            1
        }

        async fn fetch_raw(&self, _symbol: &str, _start: NaiveDate, _end: NaiveDate) -> Result<serde_json::Value, Error> {
            Ok(serde_json::Value::Null)
        }

        fn normalize(&self, _raw: serde_json::Value, symbol: &str) -> Result<BarSeries, Error> {
            let bars = self
                .rows
                .iter()
                .map(|(date, close, volume)| Bar {
                    symbol: symbol.to_string(),
                    date: *date,
                    open: *close,
                    high: *close,
                    low: *close,
                    close: *close,
                    volume: *volume,
                    amount: close * volume,
                    pct_chg: 0.0,
                    ma5: None,
                    ma10: None,
                    ma20: None,
                    volume_ratio: None,
                    macd: None,
                    macd_signal: None,
                    macd_hist: None,
                    rsi: None,
                    atr: None,
                    data_source: "fake".to_string(),
                    created_at: None,
                    updated_at: None,
                })
                .collect();
            Ok(BarSeries::new(bars))
        }
    }

    #[tokio::test]
    async fn get_daily_fills_indicators_and_sorts_ascending() {
        let fetcher = FakeFetcher {
            rows: (0..30)
                .rev()
                .map(|i| {
                    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i);
                    (date, 10.0 + i as f64 * 0.1, 1000.0)
                })
                .collect(),
        };
        let series = get_daily(&fetcher, "600519", None, None, 60).await.unwrap();
        assert_eq!(series.len(), 30);
        for w in series.bars.windows(2) {
            assert!(w[0].date < w[1].date);
        }
        assert!(series.bars.last().unwrap().ma5.is_some());
        assert!(series.bars.last().unwrap().rsi.is_some());
    }

    #[tokio::test]
    async fn get_daily_errors_when_normalize_yields_no_rows() {
        let fetcher = FakeFetcher { rows: vec![] };
        let result = get_daily(&fetcher, "600519", None, None, 60).await;
        assert!(result.is_err());
    }
}
