use once_cell::sync::Lazy;
use regex::Regex;
use signal_core::Error;

static A_STOCK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());
static HK_STOCK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\d{4,5}(\.?HK)?$").unwrap());

/// Validates and normalizes a stock code. Accepts canonical 6-digit
/// A-share codes and 4-5 digit HK codes with an optional `.HK`/`HK`
/// decoration; rejects everything else.
pub fn validate_stock_code(code: &str) -> Result<String, Error> {
    let trimmed = code.trim();
    if A_STOCK_PATTERN.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    if HK_STOCK_PATTERN.is_match(trimmed) {
        return Ok(trimmed.to_uppercase());
    }
    Err(Error::Validation(format!("invalid stock code: {code}")))
}

pub fn is_a_share_code(code: &str) -> bool {
    A_STOCK_PATTERN.is_match(code.trim())
}

pub fn is_hk_code(code: &str) -> bool {
    HK_STOCK_PATTERN.is_match(code.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_six_digit_a_share_codes() {
        assert!(validate_stock_code("600519").is_ok());
        assert!(validate_stock_code("000001").is_ok());
        assert!(!A_STOCK_PATTERN.is_match("12345"));
    }

    #[test]
    fn accepts_hk_codes_with_optional_suffix() {
        assert!(HK_STOCK_PATTERN.is_match("00700"));
        assert!(HK_STOCK_PATTERN.is_match("00700.HK"));
        assert!(!HK_STOCK_PATTERN.is_match("123"));
    }

    #[test]
    fn rejects_garbage_codes() {
        assert!(validate_stock_code("abc123!").is_err());
        assert!(validate_stock_code("").is_err());
    }
}
