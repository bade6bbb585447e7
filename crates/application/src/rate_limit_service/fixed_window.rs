use std::sync::Arc;

use pawguard_core::AppResult;
use pawguard_domain::{Decision, RateKey, WindowPolicy};
use tracing::debug;

use super::ports::CounterStore;

/// Fixed-window limiter: one counter per key, expiring one window after the
/// first attempt.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    policy: WindowPolicy,
}

impl FixedWindowLimiter {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, policy: WindowPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the window policy.
    #[must_use]
    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Records one attempt for `key` and decides whether it is admitted.
    ///
    /// Rejected attempts still count towards the window.
    pub async fn check(&self, key: &RateKey) -> AppResult<Decision> {
        let count = self
            .store
            .increment_with_expiry(key.as_str(), self.policy.window_seconds())
            .await?;

        let decision = self.policy.decide(count);
        debug!(key = %key, count, admitted = decision.is_admitted(), "fixed window checked");

        Ok(decision)
    }
}
