use crate::codes::dialects_for;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use signal_core::{Bar, BarSeries, Error, Fetcher};

/// Eastmoney's public `klines` endpoint. Rows arrive as one
/// comma-separated string per day; parsed in `normalize`. Grounded on
/// `polygon_client::PolygonClient::get_aggregates`'s
/// request-then-deserialize-into-a-private-struct shape.
pub struct EastmoneyFetcher {
    client: Client,
    priority: i32,
}

impl EastmoneyFetcher {
    pub fn new(priority: i32) -> Self {
        Self { client: Client::new(), priority }
    }

    fn secid_for(&self, symbol: &str) -> String {
        let dialects = dialects_for(symbol);
        if dialects.suffix_dot.ends_with(".SH") {
            format!("1.{symbol}")
        } else if dialects.suffix_dot.ends_with(".SZ") {
            format!("0.{symbol}")
        } else {
            format!("116.{symbol}")
        }
    }
}

#[derive(Debug, Deserialize)]
struct EastmoneyResponse {
    data: Option<EastmoneyData>,
}

#[derive(Debug, Deserialize)]
struct EastmoneyData {
    klines: Vec<String>,
}

#[async_trait]
impl Fetcher for EastmoneyFetcher {
    fn name(&self) -> &str {
        "eastmoney"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn fetch_raw(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<serde_json::Value, Error> {
        let secid = self.secid_for(symbol);
        let url = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
        let response = self
            .client
            .get(url)
            .query(&[
                ("secid", secid.as_str()),
                ("klt", "101"),
                ("fqt", "1"),
                ("beg", &start.format("%Y%m%d").to_string()),
                ("end", &end.format("%Y%m%d").to_string()),
                ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58"),
            ])
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("eastmoney request failed: {e}")))?;

        let body: EastmoneyResponse = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("eastmoney decode failed: {e}")))?;
        serde_json::to_value(body).map_err(|e| Error::Fetch(format!("eastmoney re-encode failed: {e}")))
    }

    fn normalize(&self, raw: serde_json::Value, symbol: &str) -> Result<BarSeries, Error> {
        let response: EastmoneyResponse =
            serde_json::from_value(raw).map_err(|e| Error::InvalidData(format!("eastmoney payload shape: {e}")))?;
        let klines = match response.data {
            Some(data) => data.klines,
            None => return Ok(BarSeries::new(Vec::new())),
        };

        let mut bars = Vec::with_capacity(klines.len());
        for row in klines {
            let fields: Vec<&str> = row.split(',').collect();
            if fields.len() < 7 {
                continue;
            }
            let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
                .map_err(|e| Error::InvalidData(format!("eastmoney date {}: {e}", fields[0])))?;
            let parse = |s: &str| s.parse::<f64>().unwrap_or(f64::NAN);
            bars.push(Bar {
                symbol: symbol.to_string(),
                date,
                open: parse(fields[1]),
                close: parse(fields[2]),
                high: parse(fields[3]),
                low: parse(fields[4]),
                volume: parse(fields[5]),
                amount: parse(fields[6]),
                pct_chg: fields.get(8).map(|s| parse(s)).unwrap_or(0.0),
                ma5: None,
                ma10: None,
                ma20: None,
                volume_ratio: None,
                macd: None,
                macd_signal: None,
                macd_hist: None,
                rsi: None,
                atr: None,
                data_source: self.name().to_string(),
                created_at: None,
                updated_at: None,
            });
        }
        Ok(BarSeries::new(bars))
    }
}

/// Tushare Pro's JSON-RPC-style `daily` API (single POST, `api_name` +
/// `token` + `params`, columnar `fields`/`items` response). Grounded on
/// the same `send_request` shape as `EastmoneyFetcher`, illustrating
/// that the template method is source-agnostic.
pub struct TushareFetcher {
    client: Client,
    token: String,
    priority: i32,
}

impl TushareFetcher {
    pub fn new(token: impl Into<String>, priority: i32) -> Self {
        Self { client: Client::new(), token: token.into(), priority }
    }
}

#[derive(Debug, Deserialize)]
struct TushareResponse {
    data: Option<TushareData>,
}

#[derive(Debug, Deserialize)]
struct TushareData {
    fields: Vec<String>,
    items: Vec<Vec<serde_json::Value>>,
}

#[async_trait]
impl Fetcher for TushareFetcher {
    fn name(&self) -> &str {
        "tushare"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn fetch_raw(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<serde_json::Value, Error> {
        let ts_code = dialects_for(symbol).suffix_dot;
        let body = serde_json::json!({
            "api_name": "daily",
            "token": self.token,
            "params": {
                "ts_code": ts_code,
                "start_date": start.format("%Y%m%d").to_string(),
                "end_date": end.format("%Y%m%d").to_string(),
            },
            "fields": "trade_date,open,high,low,close,vol,amount,pct_chg",
        });

        let response = self
            .client
            .post("https://api.tushare.pro")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("tushare request failed: {e}")))?;

        let parsed: TushareResponse = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("tushare decode failed: {e}")))?;
        serde_json::to_value(parsed).map_err(|e| Error::Fetch(format!("tushare re-encode failed: {e}")))
    }

    fn normalize(&self, raw: serde_json::Value, symbol: &str) -> Result<BarSeries, Error> {
        let response: TushareResponse =
            serde_json::from_value(raw).map_err(|e| Error::InvalidData(format!("tushare payload shape: {e}")))?;
        let data = match response.data {
            Some(d) => d,
            None => return Ok(BarSeries::new(Vec::new())),
        };

        let index_of = |name: &str| data.fields.iter().position(|f| f == name);
        let (i_date, i_open, i_high, i_low, i_close, i_vol, i_amount, i_pct) = (
            index_of("trade_date"),
            index_of("open"),
            index_of("high"),
            index_of("low"),
            index_of("close"),
            index_of("vol"),
            index_of("amount"),
            index_of("pct_chg"),
        );

        let num = |row: &[serde_json::Value], idx: Option<usize>| -> f64 {
            idx.and_then(|i| row.get(i)).and_then(|v| v.as_f64()).unwrap_or(f64::NAN)
        };

        let mut bars = Vec::with_capacity(data.items.len());
        for row in &data.items {
            let date_str = i_date
                .and_then(|i| row.get(i))
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::InvalidData("tushare row missing trade_date".to_string()))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .map_err(|e| Error::InvalidData(format!("tushare date {date_str}: {e}")))?;
            bars.push(Bar {
                symbol: symbol.to_string(),
                date,
                open: num(row, i_open),
                high: num(row, i_high),
                low: num(row, i_low),
                close: num(row, i_close),
                volume: num(row, i_vol),
                amount: num(row, i_amount),
                pct_chg: num(row, i_pct),
                ma5: None,
                ma10: None,
                ma20: None,
                volume_ratio: None,
                macd: None,
                macd_signal: None,
                macd_hist: None,
                rsi: None,
                atr: None,
                data_source: self.name().to_string(),
                created_at: None,
                updated_at: None,
            });
        }
        Ok(BarSeries::new(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eastmoney_normalizes_comma_rows_into_bars() {
        let fetcher = EastmoneyFetcher::new(1);
        let raw = serde_json::json!({
            "data": {
                "klines": [
                    "2024-01-02,10.00,10.50,10.80,9.90,120000,1260000,0,0,1.2,0",
                    "2024-01-03,10.50,10.20,10.60,10.10,98000,1010000,0,0,-2.9,0",
                ]
            }
        });
        let series = fetcher.normalize(raw, "600519").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.bars[0].close, 10.50);
        assert_eq!(series.bars[1].pct_chg, -2.9);
    }

    #[test]
    fn eastmoney_missing_data_key_yields_empty_series() {
        let fetcher = EastmoneyFetcher::new(1);
        let series = fetcher.normalize(serde_json::json!({"data": null}), "600519").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn tushare_normalizes_columnar_items_into_bars() {
        let fetcher = TushareFetcher::new("test-token", 2);
        let raw = serde_json::json!({
            "data": {
                "fields": ["trade_date", "open", "high", "low", "close", "vol", "amount", "pct_chg"],
                "items": [
                    ["20240102", 10.0, 10.8, 9.9, 10.5, 120000.0, 1260000.0, 1.2],
                ]
            }
        });
        let series = fetcher.normalize(raw, "600519").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].close, 10.5);
        assert_eq!(series.bars[0].data_source, "tushare");
    }
}
