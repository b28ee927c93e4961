use once_cell::sync::Lazy;
use regex::Regex;

const REDACTION_MARKER: &str = "***REDACTED***";

static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(api[_-]?key|token|secret|password)\s*[=:]\s*["']?[A-Za-z0-9_\-]{8,}["']?"#).unwrap());
static BEARER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Bearer\s+[A-Za-z0-9_\-\.]+").unwrap());
static SENSITIVE_QUERY_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)([?&](?:token|key|secret|password|api_key)=)[^&\s]+"#).unwrap());

/// Replaces API-key-shaped substrings, `Bearer` tokens, and sensitive
/// URL query parameters with a redaction marker before a line reaches
/// the log sink.
pub fn redact(line: &str) -> String {
    let step1 = API_KEY_PATTERN.replace_all(line, |caps: &regex::Captures| format!("{}={REDACTION_MARKER}", &caps[1]));
    let step2 = BEARER_PATTERN.replace_all(&step1, format!("Bearer {REDACTION_MARKER}"));
    SENSITIVE_QUERY_PARAM.replace_all(&step2, format!("${{1}}{REDACTION_MARKER}")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_api_key_assignment() {
        let line = "connecting with api_key=sk-proj-abcdef1234567890";
        assert!(!redact(line).contains("sk-proj-abcdef1234567890"));
    }

    #[test]
    fn redacts_bearer_tokens() {
        let line = "Authorization: Bearer abcdef123456.xyz789";
        let redacted = redact(line);
        assert!(!redacted.contains("abcdef123456"));
        assert!(redacted.contains("Bearer"));
    }

    #[test]
    fn redacts_sensitive_query_params() {
        let line = "GET https://api.example.com/data?token=abc123&symbol=600519";
        let redacted = redact(line);
        assert!(!redacted.contains("abc123"));
        assert!(redacted.contains("symbol=600519"));
    }

    #[test]
    fn leaves_ordinary_lines_untouched() {
        let line = "fetched 30 bars for 600519";
        assert_eq!(redact(line), line);
    }
}
