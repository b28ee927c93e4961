use crate::market::params_for;
use crate::sentiment::check_sentiment;
use crate::trend::{determine_trend, ma_alignment};
use crate::volume::determine_volume;
use signal_core::{Bar, BarSeries, BuySignal, Error, MarketType, Result, SignalResult};

const MA_MIN_ROWS: usize = 20;

/// Runs the four-layer pipeline against the most recent bar of `series`.
/// Never fails on data-shape problems other than insufficient history;
/// every other outcome is a `WAIT`/`BUY`/`STRONG_BUY` `SignalResult`.
pub fn analyze(symbol: &str, series: &BarSeries, news_context: Option<&str>) -> Result<SignalResult> {
    if series.len() < MA_MIN_ROWS {
        return Err(Error::InsufficientData { needed: MA_MIN_ROWS, have: series.len() });
    }

    let market_type = MarketType::detect(symbol);
    let params = params_for(market_type);

    let latest = series.bars.last().expect("checked length above");
    let prev = &series.bars[series.bars.len() - 2];

    let mut result = SignalResult::empty(symbol, market_type);
    fill_basic_data(&mut result, latest, prev);

    // Layer 1 — trend filter (hard).
    if !result.trend_status.passes_trend_filter() {
        tracing::info!(symbol, status = result.trend_status.label(), "layer 1 trend filter failed");
        result.buy_signal = BuySignal::Wait;
        result.signal_score = 0;
        result.signal_reasons = vec!["❌ 未通过趋势过滤".to_string()];
        result.risk_factors = vec![format!("⚠️ {}，不做空头", result.trend_status.label())];
        return Ok(result);
    }
    tracing::debug!(symbol, status = result.trend_status.label(), "layer 1 trend filter passed");

    let mut score: i32 = 40;
    let mut reasons = vec![format!("✅ {}，通过趋势过滤", result.trend_status.label())];

    // Layer 2 — position filter (hard).
    if result.bias_ma5.abs() >= params.bias_threshold {
        tracing::info!(symbol, bias_ma5 = result.bias_ma5, "layer 2 position filter failed");
        result.buy_signal = BuySignal::Wait;
        result.signal_score = score;
        result.signal_reasons = reasons;
        result.risk_factors = vec![format!(
            "⚠️ 乖离率{:.2}%，超过{}阈值{:.0}%",
            result.bias_ma5,
            market_type.label(),
            params.bias_threshold
        )];
        return Ok(result);
    }
    score += 30;
    if result.bias_ma5 < 0.0 {
        reasons.push(format!("✅ 乖离率{:.2}%，回踩买点", result.bias_ma5));
    } else {
        reasons.push(format!("✅ 乖离率{:.2}%，安全范围", result.bias_ma5));
    }

    // Layer 3 — auxiliary confirmation (additive only).
    let mut risks = Vec::new();
    apply_auxiliary_layer(&mut result, latest, prev, &params, &mut score, &mut reasons, &mut risks);

    // Layer 4 — sentiment filter.
    if let Some(news) = news_context {
        let outcome = check_sentiment(news);
        result.sentiment_check = true;
        result.sentiment_result = outcome.result;
        result.sentiment_score = outcome.score;
        result.sentiment_reasons = outcome.reasons.clone();

        if !outcome.passed {
            result.buy_signal = BuySignal::Wait;
            result.signal_score = score;
            result.signal_reasons = reasons;
            risks.extend(outcome.risks);
            result.risk_factors = risks;
            return Ok(result);
        }
        if outcome.score > 0 {
            score += outcome.score;
            reasons.extend(outcome.reasons);
        }
        risks.extend(outcome.risks);
    }

    result.signal_score = score.min(100);
    result.signal_reasons = reasons;
    result.risk_factors = risks;
    result.buy_signal = if score >= 70 {
        BuySignal::StrongBuy
    } else if score >= 60 {
        BuySignal::Buy
    } else {
        BuySignal::Wait
    };

    Ok(result)
}

fn fill_basic_data(result: &mut SignalResult, latest: &Bar, prev: &Bar) {
    let ma5 = latest.ma5.unwrap_or(0.0);
    let ma10 = latest.ma10.unwrap_or(0.0);
    let ma20 = latest.ma20.unwrap_or(0.0);
    let close = latest.close;

    result.ma5 = ma5;
    result.ma10 = ma10;
    result.ma20 = ma20;
    result.current_price = close;

    result.bias_ma5 = if ma5 > 0.0 { (close - ma5) / ma5 * 100.0 } else { 0.0 };
    result.bias_ma10 = if ma10 > 0.0 { (close - ma10) / ma10 * 100.0 } else { 0.0 };
    result.bias_ma20 = if ma20 > 0.0 { (close - ma20) / ma20 * 100.0 } else { 0.0 };

    result.trend_status = determine_trend(close, ma5, ma10, ma20);
    result.ma_alignment = ma_alignment(result.trend_status, ma5, ma10, ma20);

    let volume_ratio = latest.volume_ratio.unwrap_or(1.0);
    result.volume_ratio_5d = volume_ratio;
    let (volume_status, volume_trend) = determine_volume(volume_ratio, latest.pct_chg);
    result.volume_status = volume_status;
    result.volume_trend = volume_trend.to_string();

    result.macd = latest.macd.unwrap_or(0.0);
    result.macd_signal = latest.macd_signal.unwrap_or(0.0);
    result.macd_hist = latest.macd_hist.unwrap_or(0.0);
    result.rsi = latest.rsi.unwrap_or(50.0);
    result.atr = latest.atr.unwrap_or(0.0);
    result.atr_pct = if result.atr > 0.0 && close > 0.0 { result.atr / close * 100.0 } else { 0.0 };

    let _ = prev;
}

fn apply_auxiliary_layer(
    result: &mut SignalResult,
    latest: &Bar,
    prev: &Bar,
    params: &crate::market::MarketParams,
    score: &mut i32,
    reasons: &mut Vec<String>,
    risks: &mut Vec<String>,
) {
    let macd = latest.macd.unwrap_or(0.0);
    let macd_signal = latest.macd_signal.unwrap_or(0.0);
    let macd_prev = prev.macd.unwrap_or(0.0);
    let macd_signal_prev = prev.macd_signal.unwrap_or(0.0);

    result.macd_golden_cross = macd_prev <= macd_signal_prev && macd > macd_signal;
    if result.macd_golden_cross {
        *score += 10;
        reasons.push("✅ MACD金叉，趋势确认".to_string());
    } else {
        result.macd_bearish = macd_prev >= macd_signal_prev && macd < macd_signal;
        if result.macd_bearish {
            risks.push("⚠️ MACD死叉，注意风险".to_string());
        }
    }

    let rsi = result.rsi;
    if rsi < 30.0 {
        *score += 15;
        reasons.push(format!("✅ RSI={rsi:.0}，超卖区域"));
    } else if rsi < 70.0 {
        *score += 10;
        reasons.push(format!("✅ RSI={rsi:.0}，健康区域"));
    } else if rsi < 80.0 {
        risks.push(format!("⚠️ RSI={rsi:.0}，接近超买"));
    } else {
        risks.push(format!("⚠️ RSI={rsi:.0}，超买区域"));
    }

    let atr_pct = result.atr_pct;
    if params.atr_min_pct < atr_pct && atr_pct < params.atr_max_pct {
        *score += 5;
        reasons.push(format!("✅ ATR健康({atr_pct:.1}%)"));
    } else if atr_pct >= params.atr_max_pct {
        risks.push(format!("⚠️ 波动率过大({atr_pct:.1}%)"));
    }

    match result.volume_status {
        signal_core::VolumeStatus::ShrinkVolumeDown => {
            *score += 10;
            reasons.push("✅ 缩量回调，洗盘特征".to_string());
        }
        signal_core::VolumeStatus::HeavyVolumeUp => {
            *score += 8;
            reasons.push("✅ 放量上涨，多头强劲".to_string());
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(
        date: NaiveDate,
        close: f64,
        pct_chg: f64,
        ma5: f64,
        ma10: f64,
        ma20: f64,
        volume_ratio: f64,
        macd: f64,
        macd_signal: f64,
        rsi: f64,
        atr: f64,
    ) -> Bar {
        Bar {
            symbol: "TEST".to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000.0,
            amount: close * 1_000_000.0,
            pct_chg,
            ma5: Some(ma5),
            ma10: Some(ma10),
            ma20: Some(ma20),
            volume_ratio: Some(volume_ratio),
            macd: Some(macd),
            macd_signal: Some(macd_signal),
            macd_hist: Some(macd - macd_signal),
            rsi: Some(rsi),
            atr: Some(atr),
            data_source: "test".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn padding_series(mut bars: Vec<Bar>) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut filler: Vec<Bar> = (0..18)
            .map(|i| {
                bar(
                    start + chrono::Duration::days(i as i64),
                    100.0,
                    0.0,
                    100.0,
                    100.0,
                    100.0,
                    1.0,
                    0.0,
                    0.0,
                    50.0,
                    2.0,
                )
            })
            .collect();
        filler.append(&mut bars);
        BarSeries::new(filler)
    }

    #[test]
    fn s1_strong_bull_healthy_clamps_to_one_hundred() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let prev = bar(d1, 109.5, -0.2, 107.0, 105.0, 100.0, 0.6, -0.1, 0.0, 55.0, 2.2);
        let latest = bar(d2, 110.0, -0.3, 108.0, 105.0, 100.0, 0.6, 0.2, 0.1, 55.0, 2.2);
        let series = padding_series(vec![prev, latest]);

        let result = analyze("600519", &series, None).unwrap();
        assert_eq!(result.signal_score, 100);
        assert_eq!(result.buy_signal, BuySignal::StrongBuy);
        assert_eq!(result.market_type, MarketType::AShare);
    }

    #[test]
    fn s2_position_overshoot_vetoes_with_one_risk() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let prev = bar(d1, 118.0, 1.0, 109.0, 104.0, 98.0, 1.0, 0.0, 0.0, 55.0, 2.0);
        let latest = bar(d2, 120.0, 1.5, 110.0, 104.0, 98.0, 1.0, 0.1, 0.0, 55.0, 2.0);
        let series = padding_series(vec![prev, latest]);

        let result = analyze("600000", &series, None).unwrap();
        assert_eq!(result.signal_score, 40);
        assert_eq!(result.buy_signal, BuySignal::Wait);
        assert_eq!(result.risk_factors.len(), 1);
        assert!(result.risk_factors[0].contains("9.09%"));
        assert!(result.risk_factors[0].contains("5%"));
    }

    #[test]
    fn s3_trend_fail_yields_zero_score_and_no_other_reasons() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let prev = bar(d1, 95.0, -1.0, 100.0, 105.0, 110.0, 1.0, 0.0, 0.0, 45.0, 2.0);
        let latest = bar(d2, 94.0, -1.0, 99.0, 104.0, 109.0, 1.0, -0.1, 0.0, 45.0, 2.0);
        let series = padding_series(vec![prev, latest]);

        let result = analyze("600001", &series, None).unwrap();
        assert_eq!(result.signal_score, 0);
        assert_eq!(result.buy_signal, BuySignal::Wait);
        assert_eq!(result.signal_reasons, vec!["❌ 未通过趋势过滤".to_string()]);
        assert!(result.risk_factors[0].contains(result.trend_status.label()));
    }

    #[test]
    fn s4_sentiment_veto_overrides_strong_bull_score() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let prev = bar(d1, 109.5, -0.2, 107.0, 105.0, 100.0, 0.6, -0.1, 0.0, 55.0, 2.2);
        let latest = bar(d2, 110.0, -0.3, 108.0, 105.0, 100.0, 0.6, 0.2, 0.1, 55.0, 2.2);
        let series = padding_series(vec![prev, latest]);

        let result = analyze("600519", &series, Some("公司遭证监会立案调查")).unwrap();
        assert_eq!(result.buy_signal, BuySignal::Wait);
        assert_eq!(result.sentiment_result, "重大利空");
        assert!(result.risk_factors.iter().any(|r| r.contains("立案调查")));
        assert!(result.signal_reasons.iter().any(|r| r.contains("MACD金叉")));
    }

    #[test]
    fn s5_hk_relaxed_threshold_passes_layer_two() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let prev = bar(d1, 104.0, 0.1, 99.0, 95.0, 90.0, 1.0, 0.0, 0.0, 50.0, 1.5);
        let latest = bar(d2, 105.5, 0.2, 100.0, 95.0, 90.0, 1.0, 0.05, 0.02, 50.0, 1.5);
        let series = padding_series(vec![prev, latest]);

        let result = analyze("00700.HK", &series, None).unwrap();
        assert_eq!(result.market_type, MarketType::Hk);
        assert!(result.signal_score >= 70, "expected layer 2 to pass with HK's relaxed threshold");
    }

    #[test]
    fn insufficient_history_is_a_typed_error() {
        let bars: Vec<Bar> = (0..5)
            .map(|i| {
                bar(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
                    100.0,
                    0.0,
                    100.0,
                    100.0,
                    100.0,
                    1.0,
                    0.0,
                    0.0,
                    50.0,
                    2.0,
                )
            })
            .collect();
        let series = BarSeries::new(bars);
        let err = analyze("600519", &series, None).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { needed: 20, have: 5 }));
    }
}
