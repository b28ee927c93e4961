use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

const DANGEROUS_TOKENS: &[&str] = &["DROP", "DELETE", "--", "/*", "*/", ";", "UNION", "EXEC"];

/// `true` iff `identifier` matches `[A-Za-z_][A-Za-z0-9_]*` and contains
/// none of the dangerous tokens (case-insensitive).
pub fn is_safe_identifier(identifier: &str) -> bool {
    if !IDENTIFIER_PATTERN.is_match(identifier) {
        return false;
    }
    let upper = identifier.to_uppercase();
    !DANGEROUS_TOKENS.iter().any(|token| upper.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_column_name_is_safe() {
        assert!(is_safe_identifier("column_name"));
        assert!(is_safe_identifier("ma5"));
    }

    #[test]
    fn identifiers_with_sql_syntax_are_unsafe() {
        assert!(!is_safe_identifier("column; DROP TABLE"));
        assert!(!is_safe_identifier("name--"));
    }

    #[test]
    fn identifiers_starting_with_digit_are_unsafe() {
        assert!(!is_safe_identifier("1column"));
    }
}
