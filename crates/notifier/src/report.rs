use signal_core::{BuySignal, SignalResult};

/// Renders one Markdown-ish report shared verbatim across every
/// channel — WeChat/Telegram render the Markdown, Feishu/Pushover/
/// webhook/email treat it as plain text.
pub fn render_report(results: &[SignalResult]) -> String {
    let mut lines = vec!["## A股自选股智能分析报告".to_string(), String::new()];

    for result in results {
        let marker = match result.buy_signal {
            BuySignal::StrongBuy => "🔥",
            BuySignal::Buy => "✅",
            BuySignal::Hold => "🔵",
            BuySignal::Wait => "⏸",
            BuySignal::Sell => "🔻",
            BuySignal::StrongSell => "🚨",
        };
        lines.push(format!(
            "**{} {}** ({}) — {} · 评分 {}",
            marker,
            result.symbol,
            result.market_type.label(),
            result.buy_signal.label(),
            result.signal_score
        ));
        for reason in &result.signal_reasons {
            lines.push(format!("  {reason}"));
        }
        for risk in &result.risk_factors {
            lines.push(format!("  {risk}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::MarketType;

    #[test]
    fn report_includes_every_symbol_and_its_reasons() {
        let mut result = SignalResult::empty("600519", MarketType::AShare);
        result.buy_signal = BuySignal::StrongBuy;
        result.signal_score = 100;
        result.signal_reasons = vec!["✅ 多头排列，通过趋势过滤".to_string()];

        let report = render_report(&[result]);
        assert!(report.contains("600519"));
        assert!(report.contains("强烈买入"));
        assert!(report.contains("多头排列"));
    }
}
