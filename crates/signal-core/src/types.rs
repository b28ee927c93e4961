use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One day's OHLCV + derived-indicator row for one symbol.
///
/// `(symbol, date)` is the natural key. Rows failing
/// `low <= min(open, close) <= max(open, close) <= high` or carrying
/// negative volume are dropped on ingest, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
    pub pct_chg: f64,

    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,

    pub data_source: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Bar {
    /// `low <= open,close <= high` and non-negative volume.
    pub fn is_consistent(&self) -> bool {
        let lo = self.open.min(self.close);
        let hi = self.open.max(self.close);
        self.open > 0.0
            && self.close > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.low <= lo
            && hi <= self.high
            && self.volume >= 0.0
    }
}

/// Ordered, ascending-by-date sequence of bars for one symbol.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn symbol(&self) -> Option<&str> {
        self.bars.first().map(|b| b.symbol.as_str())
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// A-share vs Hong Kong. `Display` renders the canonical Chinese label
/// used both for persistence and for notifier report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketType {
    AShare,
    Hk,
}

impl MarketType {
    pub fn label(&self) -> &'static str {
        match self {
            MarketType::AShare => "A股",
            MarketType::Hk => "港股",
        }
    }

    /// First-three-digits rule: 600/601/603/688 -> Shanghai,
    /// 000/002/300 -> Shenzhen, otherwise Hong Kong.
    pub fn detect(code: &str) -> MarketType {
        let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 6 {
            let prefix = &digits[..3];
            if matches!(prefix, "600" | "601" | "603" | "688" | "000" | "002" | "300") {
                return MarketType::AShare;
            }
        }
        MarketType::Hk
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    StrongBull,
    Bull,
    WeakBull,
    Consolidation,
    WeakBear,
    Bear,
    StrongBear,
}

impl TrendStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrendStatus::StrongBull => "强势多头",
            TrendStatus::Bull => "多头排列",
            TrendStatus::WeakBull => "弱势多头",
            TrendStatus::Consolidation => "盘整",
            TrendStatus::WeakBear => "弱势空头",
            TrendStatus::Bear => "空头排列",
            TrendStatus::StrongBear => "强势空头",
        }
    }

    pub fn passes_trend_filter(&self) -> bool {
        matches!(self, TrendStatus::StrongBull | TrendStatus::Bull)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeStatus {
    HeavyVolumeUp,
    HeavyVolumeDown,
    ShrinkVolumeUp,
    ShrinkVolumeDown,
    Normal,
}

impl VolumeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VolumeStatus::HeavyVolumeUp => "放量上涨",
            VolumeStatus::HeavyVolumeDown => "放量下跌",
            VolumeStatus::ShrinkVolumeUp => "缩量上涨",
            VolumeStatus::ShrinkVolumeDown => "缩量回调",
            VolumeStatus::Normal => "量能正常",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuySignal {
    StrongBuy,
    Buy,
    Hold,
    Wait,
    Sell,
    StrongSell,
}

impl BuySignal {
    pub fn label(&self) -> &'static str {
        match self {
            BuySignal::StrongBuy => "强烈买入",
            BuySignal::Buy => "买入",
            BuySignal::Hold => "持有",
            BuySignal::Wait => "观望",
            BuySignal::Sell => "卖出",
            BuySignal::StrongSell => "强烈卖出",
        }
    }
}

/// Output of the decision engine for one symbol at one evaluation.
/// Created per call, never mutated, serializable for transport to the
/// notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub market_type: MarketType,

    pub trend_status: TrendStatus,
    pub ma_alignment: String,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub current_price: f64,
    pub bias_ma5: f64,
    pub bias_ma10: f64,
    pub bias_ma20: f64,

    pub volume_status: VolumeStatus,
    pub volume_ratio_5d: f64,
    pub volume_trend: String,

    pub buy_signal: BuySignal,
    pub signal_score: i32,
    pub signal_reasons: Vec<String>,
    pub risk_factors: Vec<String>,

    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub macd_golden_cross: bool,
    pub macd_bearish: bool,
    pub rsi: f64,
    pub atr: f64,
    pub atr_pct: f64,

    pub sentiment_check: bool,
    pub sentiment_result: String,
    pub sentiment_score: i32,
    pub sentiment_reasons: Vec<String>,
}

impl SignalResult {
    pub fn empty(symbol: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            symbol: symbol.into(),
            market_type,
            trend_status: TrendStatus::Consolidation,
            ma_alignment: String::new(),
            ma5: 0.0,
            ma10: 0.0,
            ma20: 0.0,
            ma60: 0.0,
            current_price: 0.0,
            bias_ma5: 0.0,
            bias_ma10: 0.0,
            bias_ma20: 0.0,
            volume_status: VolumeStatus::Normal,
            volume_ratio_5d: 0.0,
            volume_trend: String::new(),
            buy_signal: BuySignal::Wait,
            signal_score: 0,
            signal_reasons: Vec::new(),
            risk_factors: Vec::new(),
            macd: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            macd_golden_cross: false,
            macd_bearish: false,
            rsi: 50.0,
            atr: 0.0,
            atr_pct: 0.0,
            sentiment_check: false,
            sentiment_result: String::new(),
            sentiment_score: 0,
            sentiment_reasons: Vec::new(),
        }
    }
}

/// `(name, priority, state)` tuple the fetch manager iterates. `state`
/// lives for the process lifetime.
#[derive(Debug, Clone)]
pub struct FetcherDescriptor {
    pub name: String,
    pub priority: i32,
}

/// Channel kinds the notifier can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    WeChat,
    Feishu,
    Telegram,
    Email,
    Pushover,
    CustomWebhook,
}

impl ChannelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::WeChat => "wechat",
            ChannelKind::Feishu => "feishu",
            ChannelKind::Telegram => "telegram",
            ChannelKind::Email => "email",
            ChannelKind::Pushover => "pushover",
            ChannelKind::CustomWebhook => "custom_webhook",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_type_detects_shanghai_and_shenzhen() {
        assert_eq!(MarketType::detect("600519"), MarketType::AShare);
        assert_eq!(MarketType::detect("000001"), MarketType::AShare);
        assert_eq!(MarketType::detect("300750"), MarketType::AShare);
        assert_eq!(MarketType::detect("00700.HK"), MarketType::Hk);
        assert_eq!(MarketType::detect("9988"), MarketType::Hk);
    }

    #[test]
    fn bar_consistency_rejects_inverted_ranges() {
        let mut bar = Bar {
            symbol: "600519".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 1000.0,
            amount: 11_000.0,
            pct_chg: 1.0,
            ma5: None,
            ma10: None,
            ma20: None,
            volume_ratio: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
            rsi: None,
            atr: None,
            data_source: "test".into(),
            created_at: None,
            updated_at: None,
        };
        assert!(bar.is_consistent());
        bar.high = 8.0;
        assert!(!bar.is_consistent());
    }
}
