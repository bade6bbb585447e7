//! Window policies and sliding-window arithmetic.

use pawguard_core::{AppError, AppResult};

use crate::Decision;

/// Capacity and length of a rate limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    max_requests: u64,
    window_seconds: u64,
}

impl WindowPolicy {
    /// Creates a policy admitting `max_requests` per `window_seconds`.
    pub fn new(max_requests: u64, window_seconds: u64) -> AppResult<Self> {
        if max_requests == 0 {
            return Err(AppError::Validation(
                "rate limit max_requests must be greater than zero".to_owned(),
            ));
        }

        if window_seconds == 0 {
            return Err(AppError::Validation(
                "rate limit window_seconds must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            max_requests,
            window_seconds,
        })
    }

    /// General traffic: 100 requests per rolling hour.
    #[must_use]
    pub const fn edge_default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 60 * 60,
        }
    }

    /// Password reset: 3 requests per email per hour.
    #[must_use]
    pub const fn password_reset() -> Self {
        Self {
            max_requests: 3,
            window_seconds: 60 * 60,
        }
    }

    /// Maximum admitted requests per window.
    #[must_use]
    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Window length in seconds.
    #[must_use]
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Index of the fixed bucket containing `epoch_seconds`.
    #[must_use]
    pub fn bucket_index(&self, epoch_seconds: u64) -> u64 {
        epoch_seconds / self.window_seconds
    }

    /// Seconds elapsed since the start of the bucket containing `epoch_seconds`.
    #[must_use]
    pub fn elapsed_in_bucket(&self, epoch_seconds: u64) -> u64 {
        epoch_seconds % self.window_seconds
    }

    /// Weighted two-bucket estimate of the requests seen in the trailing
    /// window: the current bucket in full plus the share of the previous
    /// bucket that still overlaps the lookback.
    #[must_use]
    pub fn sliding_count(&self, previous: u64, current: u64, elapsed_seconds: u64) -> u64 {
        let window = u128::from(self.window_seconds);
        let overlap = window.saturating_sub(u128::from(elapsed_seconds).min(window));
        let carried = u128::from(previous) * overlap / window;

        current.saturating_add(u64::try_from(carried).unwrap_or(u64::MAX))
    }

    /// Turns a window count into a decision.
    #[must_use]
    pub fn decide(&self, count: u64) -> Decision {
        if count <= self.max_requests {
            Decision::Admitted {
                remaining: self.max_requests - count,
            }
        } else {
            Decision::Rejected {
                retry_after_seconds: self.window_seconds,
            }
        }
    }
}
