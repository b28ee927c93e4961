use signal_core::MarketType;

/// Market-specific thresholds used by layers 2 and 3. The A-share row
/// mirrors the original configuration; HK's `atr_max_pct` is taken from
/// the most recently retained variant of the source config rather than
/// the older 6.0 figure still present in one duplicate copy.
#[derive(Debug, Clone, Copy)]
pub struct MarketParams {
    pub bias_threshold: f64,
    pub atr_min_pct: f64,
    pub atr_max_pct: f64,
}

pub fn params_for(market_type: MarketType) -> MarketParams {
    match market_type {
        MarketType::AShare => MarketParams { bias_threshold: 5.0, atr_min_pct: 1.0, atr_max_pct: 3.0 },
        MarketType::Hk => MarketParams { bias_threshold: 6.0, atr_min_pct: 1.0, atr_max_pct: 4.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_share_and_hk_rows_differ() {
        let a = params_for(MarketType::AShare);
        let hk = params_for(MarketType::Hk);
        assert_eq!(a.bias_threshold, 5.0);
        assert_eq!(hk.bias_threshold, 6.0);
        assert_eq!(a.atr_max_pct, 3.0);
        assert_eq!(hk.atr_max_pct, 4.0);
    }
}
