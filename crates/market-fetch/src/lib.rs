pub mod codes;
pub mod fetchers;
pub mod manager;
pub mod template;

pub use codes::{dialects_for, CodeDialects};
pub use fetchers::{EastmoneyFetcher, TushareFetcher};
pub use manager::FetchManager;
pub use template::get_daily;
