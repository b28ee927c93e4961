/// Human-readable interpretation of one indicator value. Pure function
/// of the value; never references the decision engine, avoiding the
/// cyclic-import smell the original source carries between the two.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSignal {
    pub name: &'static str,
    pub value: f64,
    pub status: &'static str,
    pub level: &'static str,
    pub signal: &'static str,
    pub advice: &'static str,
    pub reason: String,
    pub emoji: &'static str,
}

/// Thresholds reproduced exactly from `technical_indicators.py`'s
/// `interpret_macd`: bar > 0.01 is golden cross, bar < -0.01 is dead
/// cross, else oscillation, each stratified by DIF/DEA signs.
pub fn interpret_macd(dif: f64, dea: f64, bar: f64) -> IndicatorSignal {
    let (status, emoji, level, signal, advice, trend) = if bar > 0.01 {
        if dif > 0.0 && dea > 0.0 {
            ("金叉", "🟢", "极强", "强烈买入", "重仓持有，趋势良好", "上升趋势确立")
        } else if dif > 0.0 {
            ("金叉", "🟢", "强", "买入", "逢低加仓，持有为主", "多头反弹")
        } else {
            ("金叉", "🟢", "中", "试探性买入", "轻仓试探，关注反弹持续性", "底部反弹")
        }
    } else if bar < -0.01 {
        if dif < 0.0 && dea < 0.0 {
            ("死叉", "🔴", "极弱", "强烈卖出", "空仓观望，等待企稳", "下降趋势确立")
        } else if dif < 0.0 {
            ("死叉", "🔴", "弱", "卖出", "逢高减仓，控制风险", "空头回落")
        } else {
            ("死叉", "🔴", "中", "试探性卖出", "获利减仓，防范回调", "顶部回落")
        }
    } else if dif > dea {
        ("震荡", "🟡", "中偏强", "偏多", "持有等待，关注突破方向", "多头蓄势")
    } else if dif < dea {
        ("震荡", "🟡", "中偏弱", "偏空", "观望为主，等待企稳信号", "空头蓄势")
    } else {
        ("震荡", "🟡", "中性", "中性", "震荡观望，等待明确信号", "横盘整理")
    };

    IndicatorSignal {
        name: "MACD",
        value: bar,
        status,
        level,
        signal,
        advice,
        reason: format!("DIF={dif:.3} | DEA={dea:.3} | BAR={bar:.3} | 趋势={trend}"),
        emoji,
    }
}

/// Zone boundaries reproduced exactly from `interpret_rsi`.
pub fn interpret_rsi(rsi_value: f64) -> IndicatorSignal {
    let (status, level, emoji, signal, advice) = if rsi_value >= 80.0 {
        ("严重超买", "极强", "🔴", "警惕回调", "高位减仓，锁定利润，或使用期权保护")
    } else if rsi_value >= 70.0 {
        ("超买", "强", "🟠", "注意回调", "持有为主，适当减仓，避免追高")
    } else if rsi_value <= 20.0 {
        ("严重超卖", "极弱", "🟢", "可能反转", "关注反弹机会，轻仓试探，分批建仓")
    } else if rsi_value <= 30.0 {
        ("超卖", "弱", "🟡", "关注底部", "等待企稳信号，谨慎抄底，可小仓位试探")
    } else if (40.0..=60.0).contains(&rsi_value) {
        ("中性区域", "中性", "⚪", "震荡观望", "观望为主，等待突破方向明确")
    } else if rsi_value > 60.0 {
        ("强势区域", "中偏强", "🟢", "偏多", "持有为主，可适度加仓")
    } else {
        ("弱势区域", "中偏弱", "🟡", "偏空", "控制仓位，等待企稳")
    };

    IndicatorSignal {
        name: "RSI",
        value: rsi_value,
        status,
        level,
        signal,
        advice,
        reason: format!("RSI(14)={rsi_value:.2} | {status}"),
        emoji,
    }
}

/// Percentage-of-price zone boundaries reproduced exactly from
/// `interpret_atr`.
pub fn interpret_atr(atr_value: f64, price: f64) -> IndicatorSignal {
    let atr_pct = if price > 0.0 { atr_value / price * 100.0 } else { 0.0 };

    let (status, level, emoji, signal, advice, volatility, risk) = if atr_pct >= 5.0 {
        ("极端波动", "极高风险", "🔴", "剧烈震荡", "严格控制仓位（≤20%），或观望等待波动率下降", "极高", "极高")
    } else if atr_pct >= 3.0 {
        ("高波动", "高风险", "🟠", "波动较大", "控制仓位（≤50%），设置好止损位", "高", "高")
    } else if atr_pct >= 1.5 {
        ("中等波动", "中风险", "🟡", "正常波动", "正常仓位（50-70%），注意止损", "中", "中")
    } else if atr_pct >= 0.5 {
        ("低波动", "低风险", "🟢", "波动较小", "可适度加仓（70-80%），注意方向选择风险", "低", "低")
    } else {
        ("极低波动", "极低风险", "⚪", "波动极小", "方向选择困难，建议观望或突破后再介入", "极低", "极低")
    };

    IndicatorSignal {
        name: "ATR",
        value: atr_value,
        status,
        level,
        signal,
        advice,
        reason: format!("ATR(14)={atr_value:.2} | 占比={atr_pct:.2}% | 波动率={volatility} | 风险等级={risk}"),
        emoji,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSignal {
    pub location: &'static str,
    pub position_pct: f64,
    pub bandwidth: f64,
    pub signal: &'static str,
    pub advice: &'static str,
    pub emoji: &'static str,
    pub reason: String,
}

/// Percent-of-band zone boundaries reproduced exactly from
/// `interpret_bollinger_bands`.
pub fn interpret_bollinger_bands(price: f64, upper: f64, middle: f64, lower: f64) -> BollingerSignal {
    let bandwidth = if middle > 0.0 { (upper - lower) / middle * 100.0 } else { 0.0 };
    let position_pct = if upper - lower > 0.0 {
        (price - lower) / (upper - lower) * 100.0
    } else {
        50.0
    };

    let (location, signal, advice, emoji) = if position_pct >= 90.0 {
        ("上轨上方", "卖出信号", "严重超买，建议减仓或止盈", "🔴")
    } else if position_pct >= 75.0 {
        ("上轨附近", "偏弱信号", "注意压力，可适当减仓", "🟠")
    } else if position_pct <= 10.0 {
        ("下轨下方", "买入信号", "严重超卖，可考虑抄底", "🟢")
    } else if position_pct <= 25.0 {
        ("下轨附近", "偏强信号", "支撑较强，可试探性买入", "🟡")
    } else {
        ("中轨区域", "中性", "震荡整理，等待突破", "⚪")
    };

    BollingerSignal {
        location,
        position_pct,
        bandwidth,
        signal,
        advice,
        emoji,
        reason: format!("位置={position_pct:.1}%, 带宽={bandwidth:.2}%"),
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub action: &'static str,
    pub confidence: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IndicatorsSummary {
    pub signals: Vec<IndicatorSignal>,
    pub summary: String,
    pub risk_level: String,
    pub recommendation: Recommendation,
}

const HIGH_RISK_LEVELS: [&str; 4] = ["极强", "极弱", "高风险", "极高风险"];

/// Rolls up a set of indicator signals into a summary line, an overall
/// risk level, and a recommended action. Supplementary relative to the
/// distilled spec (it enriches the notifier report) but a direct,
/// cheap port of `generate_indicators_summary`.
pub fn summarize(signals: Vec<IndicatorSignal>) -> IndicatorsSummary {
    if signals.is_empty() {
        return IndicatorsSummary {
            signals,
            summary: "暂无技术指标数据".to_string(),
            risk_level: "未知".to_string(),
            recommendation: Recommendation {
                action: "观望",
                confidence: "低",
                reason: "缺少技术指标数据".to_string(),
            },
        };
    }

    let summary = signals
        .iter()
        .map(|s| format!("{} {}: {} ({}) - {}", s.emoji, s.name, s.status, s.level, s.signal))
        .collect::<Vec<_>>()
        .join(" | ");

    let high_risk_count = signals.iter().filter(|s| HIGH_RISK_LEVELS.contains(&s.level)).count();
    let total = signals.len();
    let ratio = high_risk_count as f64 / total as f64;
    let risk_level = if ratio >= 0.6 {
        "高风险 🔴"
    } else if ratio >= 0.3 {
        "中风险 🟠"
    } else {
        "低风险 🟢"
    }
    .to_string();

    let buy_signals = signals.iter().filter(|s| s.signal.contains('买')).count();
    let sell_signals = signals.iter().filter(|s| s.signal.contains('卖')).count();
    let recommendation = if buy_signals as f64 > total as f64 * 0.6 {
        Recommendation {
            action: "买入",
            confidence: "高",
            reason: format!("多个技术指标显示买入信号（{buy_signals}/{total}）"),
        }
    } else if sell_signals as f64 > total as f64 * 0.6 {
        Recommendation {
            action: "卖出",
            confidence: "高",
            reason: format!("多个技术指标显示卖出信号（{sell_signals}/{total}）"),
        }
    } else {
        Recommendation {
            action: "观望",
            confidence: "中",
            reason: "技术指标信号不一致，建议等待明确方向".to_string(),
        }
    };

    IndicatorsSummary {
        signals,
        summary,
        risk_level,
        recommendation,
    }
}
