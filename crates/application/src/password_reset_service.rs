//! Rate-limited password reset in front of the upstream identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use pawguard_core::{AppError, AppResult};
use pawguard_domain::{Decision, EmailAddress, RateKey, WindowPolicy};
use tracing::info;

use crate::rate_limit_service::{CounterStore, FixedWindowLimiter};

#[cfg(test)]
mod tests;

/// Port for the upstream account-recovery API.
#[async_trait]
pub trait AccountRecoveryGateway: Send + Sync {
    /// Asks the identity provider to email a recovery link.
    ///
    /// Error statuses from the provider surface as `AppError::Upstream`.
    async fn send_recovery_email(&self, email: &EmailAddress) -> AppResult<()>;
}

/// Application service enforcing at most three resets per email per hour.
#[derive(Clone)]
pub struct PasswordResetService {
    limiter: FixedWindowLimiter,
    recovery_gateway: Arc<dyn AccountRecoveryGateway>,
}

impl PasswordResetService {
    /// Creates the service with the fixed password-reset window policy.
    #[must_use]
    pub fn new(
        counter_store: Arc<dyn CounterStore>,
        recovery_gateway: Arc<dyn AccountRecoveryGateway>,
    ) -> Self {
        Self {
            limiter: FixedWindowLimiter::new(counter_store, WindowPolicy::password_reset()),
            recovery_gateway,
        }
    }

    /// Validates the address, counts the attempt and forwards it upstream.
    ///
    /// Invalid addresses fail before the store is touched. Rejected attempts
    /// never reach the identity provider.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let email = EmailAddress::new(email)
            .map_err(|_| AppError::Validation("invalid email address".to_owned()))?;

        let key = RateKey::for_password_reset(&email);
        if let Decision::Rejected {
            retry_after_seconds,
        } = self.limiter.check(&key).await?
        {
            info!(key = %key, "password reset rate limit exceeded");
            return Err(AppError::RateLimited {
                message: "Too many password reset requests. Please try again later.".to_owned(),
                retry_after_seconds,
            });
        }

        self.recovery_gateway.send_recovery_email(&email).await
    }
}
