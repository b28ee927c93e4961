/// Sanity bounds for OHLCV fields, rejecting clearly corrupt rows
/// (zero/negative prices, implausibly large prints) before they ever
/// reach storage.
pub fn is_valid_price(price: f64) -> bool {
    price > 0.0 && price < 100_000.0
}

pub fn is_valid_volume(volume: f64) -> bool {
    volume >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_implausibly_large_prices() {
        assert!(is_valid_price(100.0));
        assert!(!is_valid_price(0.0));
        assert!(!is_valid_price(100_000.0));
    }

    #[test]
    fn rejects_negative_volume() {
        assert!(is_valid_volume(1_000_000.0));
        assert!(!is_valid_volume(-1.0));
    }
}
