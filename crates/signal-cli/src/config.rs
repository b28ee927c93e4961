use notifier::NotifierConfig;

/// Process-lifetime configuration loaded once at startup and passed
/// down explicitly — replacing the original's module-level singleton
/// with ordinary dependency injection.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbols: Vec<String>,
    pub max_concurrency: usize,
    pub days_of_history: i64,

    pub tushare_token: Option<String>,
    pub database_path: String,
    pub name_cache_path: String,

    pub akshare_sleep_min: f64,
    pub akshare_sleep_max: f64,
    pub tushare_rate_limit_per_minute: u32,

    pub max_retries: u32,
    pub retry_base_delay: f64,
    pub retry_max_delay: f64,

    pub log_dir: String,
    pub log_level: String,

    pub scheduler_enabled: bool,
    pub scheduler_daily_time: String,
    pub single_stock_notify: bool,

    pub notifier: NotifierConfig,
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")).unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let notifier = NotifierConfig {
            wechat_webhook_url: std::env::var("WECHAT_WEBHOOK_URL").ok().filter(|s| !s.is_empty()),
            feishu_webhook_url: std::env::var("FEISHU_WEBHOOK_URL").ok().filter(|s| !s.is_empty()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty()),
            email_sender: std::env::var("EMAIL_SENDER").ok().filter(|s| !s.is_empty()),
            email_password: std::env::var("EMAIL_PASSWORD").ok().filter(|s| !s.is_empty()),
            email_receivers: env_list("EMAIL_RECEIVERS"),
            pushover_user_key: std::env::var("PUSHOVER_USER_KEY").ok().filter(|s| !s.is_empty()),
            pushover_api_token: std::env::var("PUSHOVER_API_TOKEN").ok().filter(|s| !s.is_empty()),
            custom_webhook_urls: env_list("CUSTOM_WEBHOOK_URLS"),
            custom_webhook_bearer_token: std::env::var("CUSTOM_WEBHOOK_BEARER_TOKEN").ok().filter(|s| !s.is_empty()),
            max_bytes: env_parsed("NOTIFIER_MAX_BYTES", 20_000),
        };

        Self {
            symbols: env_list("WATCHLIST_SYMBOLS"),
            max_concurrency: env_parsed("MAX_CONCURRENCY", 3),
            days_of_history: env_parsed("DAYS_OF_HISTORY", 120),

            tushare_token: std::env::var("TUSHARE_TOKEN").ok().filter(|s| !s.is_empty()),
            database_path: env_string("DATABASE_PATH", "stock_signal.db"),
            name_cache_path: env_string("NAME_CACHE_PATH", "cache/stock_names.json"),

            akshare_sleep_min: env_parsed("AKSHARE_SLEEP_MIN", 0.5),
            akshare_sleep_max: env_parsed("AKSHARE_SLEEP_MAX", 1.5),
            tushare_rate_limit_per_minute: env_parsed("TUSHARE_RATE_LIMIT_PER_MINUTE", 180),

            max_retries: env_parsed("MAX_RETRIES", 3),
            retry_base_delay: env_parsed("RETRY_BASE_DELAY", 1.0),
            retry_max_delay: env_parsed("RETRY_MAX_DELAY", 30.0),

            log_dir: env_string("LOG_DIR", "logs"),
            log_level: env_string("LOG_LEVEL", "info"),

            scheduler_enabled: env_bool("SCHEDULER_ENABLED", false),
            scheduler_daily_time: env_string("SCHEDULER_DAILY_TIME", "09:30"),
            single_stock_notify: env_bool("SINGLE_STOCK_NOTIFY", false),

            notifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_list_splits_and_trims_commas() {
        std::env::set_var("SIGNAL_CLI_TEST_LIST", " 600519 , 000001 ,,300750");
        let parsed = env_list("SIGNAL_CLI_TEST_LIST");
        assert_eq!(parsed, vec!["600519", "000001", "300750"]);
        std::env::remove_var("SIGNAL_CLI_TEST_LIST");
    }

    #[test]
    fn missing_env_vars_fall_back_to_defaults() {
        std::env::remove_var("MAX_CONCURRENCY_TEST_MISSING");
        assert_eq!(env_parsed::<usize>("MAX_CONCURRENCY_TEST_MISSING", 3), 3);
    }
}
