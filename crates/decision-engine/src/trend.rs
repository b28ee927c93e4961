use signal_core::TrendStatus;

/// MA-ordering rules for the most recent bar. WEAK_BULL/WEAK_BEAR are
/// reachable independently of the strong/plain variants — each branch
/// covers a condition not already matched above it.
pub fn determine_trend(close: f64, ma5: f64, ma10: f64, ma20: f64) -> TrendStatus {
    if close > ma5 && ma5 > ma10 && ma10 > ma20 && ma20 > 0.0 {
        if (ma5 - ma10) > (ma10 - ma20) {
            return TrendStatus::StrongBull;
        }
        return TrendStatus::Bull;
    }
    if close < ma5 && ma5 < ma10 && ma10 < ma20 && ma20 > 0.0 {
        if (ma10 - ma5) > (ma20 - ma10) {
            return TrendStatus::StrongBear;
        }
        return TrendStatus::Bear;
    }
    if close > ma5 && ma5 > ma10 && ma10 > ma20 {
        return TrendStatus::WeakBull;
    }
    if close < ma5 && ma5 < ma10 && ma10 < ma20 {
        return TrendStatus::WeakBear;
    }
    TrendStatus::Consolidation
}

pub fn ma_alignment(status: TrendStatus, ma5: f64, ma10: f64, ma20: f64) -> String {
    match status {
        TrendStatus::StrongBull | TrendStatus::Bull => {
            format!("MA5({ma5:.2}) > MA10({ma10:.2}) > MA20({ma20:.2})")
        }
        TrendStatus::Bear | TrendStatus::StrongBear => {
            format!("MA5({ma5:.2}) < MA10({ma10:.2}) < MA20({ma20:.2})")
        }
        _ => "均线缠绕".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_bull_requires_widening_gap() {
        assert_eq!(determine_trend(110.0, 108.0, 105.0, 100.0), TrendStatus::Bull);
        assert_eq!(determine_trend(116.0, 110.0, 104.0, 100.0), TrendStatus::StrongBull);
    }

    #[test]
    fn weak_bull_is_reachable_when_ma20_is_zero() {
        assert_eq!(determine_trend(10.0, 9.0, 8.0, 0.0), TrendStatus::WeakBull);
    }

    #[test]
    fn bear_ordering_detected() {
        assert_eq!(determine_trend(90.0, 95.0, 100.0, 105.0), TrendStatus::Bear);
    }

    #[test]
    fn mixed_ordering_is_consolidation() {
        assert_eq!(determine_trend(100.0, 98.0, 101.0, 99.0), TrendStatus::Consolidation);
    }
}
