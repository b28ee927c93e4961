pub mod prompt;
pub mod range;
pub mod redact;
pub mod sql;
pub mod stock_code;

pub use prompt::{detect_injection, has_injection_attempt, sanitize};
pub use range::{is_valid_price, is_valid_volume};
pub use redact::redact;
pub use sql::is_safe_identifier;
pub use stock_code::{is_a_share_code, is_hk_code, validate_stock_code};
