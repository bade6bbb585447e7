//! Shared primitives for all Rust crates in Pawguard.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Pawguard crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller exhausted its budget for the current window.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Human readable explanation.
        message: String,
        /// Seconds the caller should wait before retrying.
        retry_after_seconds: u64,
    },

    /// A secret or endpoint required by the operation is not configured.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The counter store could not be reached or returned garbage.
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// An upstream HTTP dependency answered with an error status.
    #[error("upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status returned by the upstream service.
        status: u16,
        /// Message extracted from the upstream response body.
        message: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
