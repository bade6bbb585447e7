//! Application services and ports.

#![forbid(unsafe_code)]

mod password_reset_service;
mod rate_limit_service;

pub use password_reset_service::{AccountRecoveryGateway, PasswordResetService};
pub use rate_limit_service::{CounterStore, FixedWindowLimiter, SlidingWindowLimiter};
