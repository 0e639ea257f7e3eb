//! Rate limiting error types.

use thiserror::Error;

/// Errors that can occur during rate limit checks.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The backing store could not be reached (fail-open applies).
    #[error("rate limit store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<fred::error::Error> for RateLimitError {
    fn from(err: fred::error::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
