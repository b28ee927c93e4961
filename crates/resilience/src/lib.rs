pub mod cache;
pub mod circuit_breaker;
pub mod rate_limiter;
pub mod retry;

pub use cache::CacheManager;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState, CircuitBreakerOpenError};
pub use rate_limiter::RateLimiter;
pub use retry::RetryHelper;
