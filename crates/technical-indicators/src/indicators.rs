/// Number of leading rows for which MACD/ATR are reported as null and
/// RSI is reported as the neutral sentinel 50.0, per spec.md §3.
pub const WARMUP_ROWS: usize = 26;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `MA_k[i] = mean(close[max(0, i-k+1)..=i])`. Defined for every index
/// (expanding window at the start), never NaN.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut window_sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        window_sum += v;
        if i >= period {
            window_sum -= values[i - period];
        }
        let window_len = (i + 1).min(period);
        out.push(round2(window_sum / window_len as f64));
    }
    out
}

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first
/// observed value (no bias adjustment), matching spec.md §4.5's
/// `α_span` form.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = 0.0;
    for (i, &v) in values.iter().enumerate() {
        let value = if i == 0 { v } else { alpha * v + (1.0 - alpha) * prev };
        prev = value;
        out.push(value);
    }
    out
}

pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

pub fn macd(close: &[f64]) -> Macd {
    let ema12 = ema(close, 12);
    let ema26 = ema(close, 26);
    let macd_line: Vec<f64> = ema12.iter().zip(ema26.iter()).map(|(a, b)| a - b).collect();
    let signal = ema(&macd_line, 9);
    let hist: Vec<f64> = macd_line.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();
    Macd {
        macd: macd_line.iter().map(|v| round2(*v)).collect(),
        signal: signal.iter().map(|v| round2(*v)).collect(),
        hist: hist.iter().map(|v| round2(*v)).collect(),
    }
}

/// `volume_ratio[i] = volume[i] / mean(volume[max(0, i-5)..i-1])`,
/// NaN (no prior rows) maps to 1.0.
pub fn volume_ratio(volume: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(volume.len());
    for i in 0..volume.len() {
        if i == 0 {
            out.push(1.0);
            continue;
        }
        let start = i.saturating_sub(5);
        let window = &volume[start..i];
        if window.is_empty() {
            out.push(1.0);
            continue;
        }
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let ratio = if mean == 0.0 { f64::NAN } else { volume[i] / mean };
        out.push(if ratio.is_finite() { round2(ratio) } else { 1.0 });
    }
    out
}

/// RSI(14) with a 14-row *simple* mean of gains/losses (not Wilder
/// recursive smoothing) per spec.md §4.5. NaN (zero average loss) maps
/// to the neutral sentinel 50.
pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    let mut gains = vec![0.0; close.len()];
    let mut losses = vec![0.0; close.len()];
    for i in 1..close.len() {
        let delta = close[i] - close[i - 1];
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    let mut out = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        if i == 0 {
            out.push(50.0);
            continue;
        }
        let start = (i + 1).saturating_sub(period).max(1);
        let window_gains = &gains[start..=i];
        let window_losses = &losses[start..=i];
        let avg_gain = window_gains.iter().sum::<f64>() / window_gains.len() as f64;
        let avg_loss = window_losses.iter().sum::<f64>() / window_losses.len() as f64;
        let value = if avg_loss == 0.0 {
            // RS = avg_gain / 0 is undefined; spec.md §4.5 maps it to
            // the neutral sentinel rather than saturating at 100.
            50.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        out.push(round2(value));
    }
    out
}

/// `tr[i] = max(high-low, |high-close[i-1]|, |low-close[i-1]|)`;
/// `atr = SMA(tr, 14)`.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let mut tr = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let range = high[i] - low[i];
        let value = if i == 0 {
            range
        } else {
            range
                .max((high[i] - close[i - 1]).abs())
                .max((low[i] - close[i - 1]).abs())
        };
        tr.push(value);
    }
    sma(&tr, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_expanding_window_at_series_start() {
        let closes = vec![10.0, 12.0, 14.0, 16.0, 18.0];
        let ma3 = sma(&closes, 3);
        assert_eq!(ma3[0], 10.0);
        assert_eq!(ma3[1], 11.0);
        assert_eq!(ma3[2], 12.0);
        assert_eq!(ma3[4], round2((14.0 + 16.0 + 18.0) / 3.0));
    }

    #[test]
    fn rsi_stays_within_bounds() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + (i as f64 * 0.3).sin() * 2.0).collect();
        for value in rsi(&closes, 14) {
            assert!((0.0..=100.0).contains(&value), "rsi out of range: {value}");
        }
    }

    #[test]
    fn rsi_all_gains_falls_back_to_neutral_sentinel() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let values = rsi(&closes, 14);
        assert_eq!(*values.last().unwrap(), 50.0);
    }

    #[test]
    fn macd_hist_equals_macd_minus_signal() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + (i as f64 * 0.1)).collect();
        let result = macd(&closes);
        for i in 0..closes.len() {
            let expected = round2(result.macd[i] - result.signal[i]);
            assert!((result.hist[i] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn volume_ratio_defaults_to_one_with_no_history() {
        let volumes = vec![1000.0];
        assert_eq!(volume_ratio(&volumes), vec![1.0]);
    }
}
