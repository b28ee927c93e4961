use signal_core::MarketType;

/// Source-specific code dialects for A-share symbols. HK symbols pass
/// through untouched — every source accepts the bare HK ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDialects {
    /// `600519.SH` / `000001.SZ`
    pub suffix_dot: String,
    /// `sh.600519` / `sz.000001`
    pub prefix_dot: String,
    /// `600519.SS` / `000001.SZ` (Yahoo-style, Shenzhen shares the `.SZ`
    /// suffix with `prefix_dot`'s exchange but the `.SS`/`.SZ` letters
    /// differ from `suffix_dot` only for Shanghai).
    pub yahoo: String,
}

fn exchange_letters(code: &str) -> (&'static str, &'static str) {
    let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
    let prefix = if digits.len() >= 3 { &digits[..3] } else { "" };
    match prefix {
        "600" | "601" | "603" | "688" => ("SH", "sh"),
        _ => ("SZ", "sz"),
    }
}

/// Translates a bare 6-digit A-share code into the dialects the
/// concrete fetchers expect. HK codes are returned unchanged in every
/// field since no A-share exchange suffix applies to them.
pub fn dialects_for(code: &str) -> CodeDialects {
    if MarketType::detect(code) == MarketType::Hk {
        return CodeDialects {
            suffix_dot: code.to_string(),
            prefix_dot: code.to_string(),
            yahoo: code.to_string(),
        };
    }
    let (suffix, prefix) = exchange_letters(code);
    let yahoo_suffix = if suffix == "SH" { "SS" } else { "SZ" };
    CodeDialects {
        suffix_dot: format!("{code}.{suffix}"),
        prefix_dot: format!("{prefix}.{code}"),
        yahoo: format!("{code}.{yahoo_suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shanghai_code_translates_to_sh_dialects() {
        let d = dialects_for("600519");
        assert_eq!(d.suffix_dot, "600519.SH");
        assert_eq!(d.prefix_dot, "sh.600519");
        assert_eq!(d.yahoo, "600519.SS");
    }

    #[test]
    fn shenzhen_code_translates_to_sz_dialects() {
        let d = dialects_for("000001");
        assert_eq!(d.suffix_dot, "000001.SZ");
        assert_eq!(d.prefix_dot, "sz.000001");
        assert_eq!(d.yahoo, "000001.SZ");
    }

    #[test]
    fn hk_code_passes_through_unchanged() {
        let d = dialects_for("00700.HK");
        assert_eq!(d.suffix_dot, "00700.HK");
        assert_eq!(d.prefix_dot, "00700.HK");
        assert_eq!(d.yahoo, "00700.HK");
    }
}
