pub mod engine;
pub mod market;
pub mod sentiment;
pub mod trend;
pub mod volume;

pub use engine::analyze;
pub use market::{params_for, MarketParams};
