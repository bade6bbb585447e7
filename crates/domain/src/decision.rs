/// Request-scoped outcome of a rate limit check. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request fits in the current window.
    Admitted {
        /// Requests left before the limit trips.
        remaining: u64,
    },
    /// The request exceeded the window capacity.
    Rejected {
        /// Seconds the caller should wait before retrying.
        retry_after_seconds: u64,
    },
}

impl Decision {
    /// Returns whether the request may proceed.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    /// Returns the retry delay for rejected requests.
    #[must_use]
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::Admitted { .. } => None,
            Self::Rejected {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
        }
    }
}
