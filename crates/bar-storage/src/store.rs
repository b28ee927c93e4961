use crate::migration::run_lazy_migration;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{Bar, Error};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

fn map_err(err: sqlx::Error) -> Error {
    Error::Storage(err.to_string())
}

/// SQLite-backed persistent store for `Bar` rows, keyed uniquely on
/// `(symbol, date)`. Runs the lazy indicator-column migration once at
/// startup; all other operations assume the full column set exists.
#[derive(Clone)]
pub struct BarStorage {
    pool: SqlitePool,
}

impl BarStorage {
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::Storage(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await.map_err(map_err)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        run_lazy_migration(&storage.pool).await;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), Error> {
        let schema = include_str!("schema.sql");
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(map_err)?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn has_row(&self, symbol: &str, date: NaiveDate) -> Result<bool, Error> {
        let row = sqlx::query("SELECT 1 FROM stock_daily WHERE symbol = ? AND date = ?")
            .bind(symbol)
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(row.is_some())
    }

    /// Most recent `n` rows, descending by date.
    pub async fn latest(&self, symbol: &str, n: i64) -> Result<Vec<Bar>, Error> {
        let rows = sqlx::query("SELECT * FROM stock_daily WHERE symbol = ? ORDER BY date DESC LIMIT ?")
            .bind(symbol)
            .bind(n)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(row_to_bar).collect()
    }

    /// Ascending by date, inclusive on both ends.
    pub async fn range(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<Bar>, Error> {
        let rows = sqlx::query("SELECT * FROM stock_daily WHERE symbol = ? AND date >= ? AND date <= ? ORDER BY date ASC")
            .bind(symbol)
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(row_to_bar).collect()
    }

    /// Upserts every bar in `series`. A uniqueness violation on insert
    /// is impossible by construction (`ON CONFLICT` overwrites instead
    /// of erroring); any other per-row failure is logged and the row
    /// skipped so a single bad row does not poison the batch. Returns
    /// the count of rows successfully written.
    pub async fn upsert(&self, bars: &[Bar], source: &str) -> Result<usize, Error> {
        let now = Utc::now().naive_utc().to_string();
        let mut count = 0;
        for bar in bars {
            let result = sqlx::query(
                "INSERT INTO stock_daily (
                    symbol, date, open, high, low, close, volume, amount, pct_chg,
                    ma5, ma10, ma20, volume_ratio, macd, macd_signal, macd_hist, rsi, atr,
                    data_source, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(symbol, date) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    volume = excluded.volume,
                    amount = excluded.amount,
                    pct_chg = excluded.pct_chg,
                    ma5 = excluded.ma5,
                    ma10 = excluded.ma10,
                    ma20 = excluded.ma20,
                    volume_ratio = excluded.volume_ratio,
                    macd = excluded.macd,
                    macd_signal = excluded.macd_signal,
                    macd_hist = excluded.macd_hist,
                    rsi = excluded.rsi,
                    atr = excluded.atr,
                    data_source = excluded.data_source,
                    updated_at = excluded.updated_at",
            )
            .bind(&bar.symbol)
            .bind(bar.date.to_string())
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(bar.amount)
            .bind(bar.pct_chg)
            .bind(bar.ma5)
            .bind(bar.ma10)
            .bind(bar.ma20)
            .bind(bar.volume_ratio)
            .bind(bar.macd)
            .bind(bar.macd_signal)
            .bind(bar.macd_hist)
            .bind(bar.rsi)
            .bind(bar.atr)
            .bind(source)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => count += 1,
                Err(err) => tracing::warn!(symbol = %bar.symbol, date = %bar.date, "upsert failed, skipping row: {err}"),
            }
        }
        Ok(count)
    }

    /// Last `days` rows plus a lightweight derived summary. Returns
    /// `None` if fewer than 20 rows are available, per the minimum
    /// history the decision engine requires.
    pub async fn analysis_context(&self, symbol: &str, days: i64) -> Result<Option<Context>, Error> {
        let mut bars = self.latest(symbol, days).await?;
        if bars.len() < 20 {
            return Ok(None);
        }
        bars.reverse(); // ascending by date for the summary math below

        let last = bars.last().unwrap();
        let prev = &bars[bars.len() - 2];
        let ma_status = ma_status_label(last);
        let volume_change_ratio = if prev.volume > 0.0 { (last.volume - prev.volume) / prev.volume } else { 0.0 };
        let price_change_ratio = if prev.close > 0.0 { (last.close - prev.close) / prev.close } else { 0.0 };

        Ok(Some(Context {
            symbol: symbol.to_string(),
            bars: bars.clone(),
            ma_status,
            volume_change_ratio,
            price_change_ratio,
            indicators: IndicatorsBlock {
                macd: last.macd,
                macd_signal: last.macd_signal,
                macd_hist: last.macd_hist,
                rsi: last.rsi,
                atr: last.atr,
            },
        }))
    }
}

/// Five-way classification of the most recent bar's MA ordering, used
/// only by `analysis_context`'s summary — a lighter-weight cousin of
/// the decision engine's seven-way `TrendStatus`, not a substitute for
/// it.
fn ma_status_label(bar: &Bar) -> String {
    let (ma5, ma10, ma20) = match (bar.ma5, bar.ma10, bar.ma20) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => return "数据不足".to_string(),
    };
    if bar.close > ma5 && ma5 > ma10 && ma10 > ma20 {
        "多头排列".to_string()
    } else if bar.close < ma5 && ma5 < ma10 && ma10 < ma20 {
        "空头排列".to_string()
    } else if bar.close > ma20 {
        "震荡偏多".to_string()
    } else if bar.close < ma20 {
        "震荡偏空".to_string()
    } else {
        "盘整".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorsBlock {
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub ma_status: String,
    pub volume_change_ratio: f64,
    pub price_change_ratio: f64,
    pub indicators: IndicatorsBlock,
}

fn row_to_bar(row: &sqlx::sqlite::SqliteRow) -> Result<Bar, Error> {
    let date_str: String = row.try_get("date").map_err(map_err)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| Error::InvalidData(e.to_string()))?;
    Ok(Bar {
        symbol: row.try_get("symbol").map_err(map_err)?,
        date,
        open: row.try_get("open").map_err(map_err)?,
        high: row.try_get("high").map_err(map_err)?,
        low: row.try_get("low").map_err(map_err)?,
        close: row.try_get("close").map_err(map_err)?,
        volume: row.try_get("volume").map_err(map_err)?,
        amount: row.try_get("amount").map_err(map_err)?,
        pct_chg: row.try_get("pct_chg").map_err(map_err)?,
        ma5: row.try_get("ma5").ok(),
        ma10: row.try_get("ma10").ok(),
        ma20: row.try_get("ma20").ok(),
        volume_ratio: row.try_get("volume_ratio").ok(),
        macd: row.try_get("macd").ok(),
        macd_signal: row.try_get("macd_signal").ok(),
        macd_hist: row.try_get("macd_hist").ok(),
        rsi: row.try_get("rsi").ok(),
        atr: row.try_get("atr").ok(),
        data_source: row.try_get("data_source").map_err(map_err)?,
        created_at: row.try_get("created_at").ok(),
        updated_at: row.try_get("updated_at").ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(symbol: &str, date: NaiveDate, close: f64, volume: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
            amount: close * volume,
            pct_chg: 0.0,
            ma5: Some(close),
            ma10: Some(close),
            ma20: Some(close),
            volume_ratio: Some(1.0),
            macd: None,
            macd_signal: None,
            macd_hist: None,
            rsi: None,
            atr: None,
            data_source: "test".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_has_row_round_trips() {
        let storage = BarStorage::new("sqlite::memory:").await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = vec![bar("600519", date, 10.0, 1000.0)];
        let count = storage.upsert(&bars, "test").await.unwrap();
        assert_eq!(count, 1);
        assert!(storage.has_row("600519", date).await.unwrap());
        assert!(!storage.has_row("600519", date.pred_opt().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row_on_conflict() {
        let storage = BarStorage::new("sqlite::memory:").await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        storage.upsert(&[bar("600519", date, 10.0, 1000.0)], "first").await.unwrap();
        storage.upsert(&[bar("600519", date, 12.0, 2000.0)], "second").await.unwrap();

        let rows = storage.latest("600519", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 12.0);
        assert_eq!(rows[0].data_source, "second");
    }

    #[tokio::test]
    async fn analysis_context_requires_at_least_twenty_rows() {
        let storage = BarStorage::new("sqlite::memory:").await.unwrap();
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<Bar> = (0..19).map(|i| bar("600519", base + chrono::Duration::days(i), 10.0, 1000.0)).collect();
        storage.upsert(&bars, "test").await.unwrap();
        assert!(storage.analysis_context("600519", 30).await.unwrap().is_none());

        storage.upsert(&[bar("600519", base + chrono::Duration::days(19), 10.0, 1000.0)], "test").await.unwrap();
        assert!(storage.analysis_context("600519", 30).await.unwrap().is_some());
    }
}
