use thiserror::Error;

/// Shared error taxonomy threaded through every crate in the workspace.
///
/// Kinds, not types: callers match on the variant, never on a wrapped
/// library error directly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("insufficient history: need at least {needed} rows, have {have}")]
    InsufficientData { needed: usize, have: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("circuit open, retry after {retry_after_secs:.1}s")]
    CircuitOpen { retry_after_secs: f64 },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
