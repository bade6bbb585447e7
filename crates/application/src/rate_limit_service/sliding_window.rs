use std::sync::Arc;

use chrono::Utc;
use pawguard_core::AppResult;
use pawguard_domain::{ClientIdentity, Decision, KeyNamespace, RateKey, WindowPolicy};
use tracing::debug;

use super::ports::CounterStore;

/// Sliding-window limiter for general traffic.
///
/// Each key owns one counter per fixed bucket of window length. The count
/// considered for a request is the current bucket plus the previous bucket
/// weighted by how much of it still overlaps the trailing window. With an
/// empty previous bucket the count is exact.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    store: Arc<dyn CounterStore>,
    namespace: KeyNamespace,
    policy: WindowPolicy,
}

impl SlidingWindowLimiter {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(
        store: Arc<dyn CounterStore>,
        namespace: KeyNamespace,
        policy: WindowPolicy,
    ) -> Self {
        Self {
            store,
            namespace,
            policy,
        }
    }

    /// Returns the window policy.
    #[must_use]
    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Records one request for `identity` at the current time.
    pub async fn check(&self, identity: &ClientIdentity) -> AppResult<Decision> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        self.check_at(identity, now).await
    }

    /// Records one request for `identity` at `epoch_seconds`.
    pub async fn check_at(
        &self,
        identity: &ClientIdentity,
        epoch_seconds: u64,
    ) -> AppResult<Decision> {
        let key = RateKey::for_client(&self.namespace, identity);
        let bucket_index = self.policy.bucket_index(epoch_seconds);
        let current_key = key.bucket(bucket_index);
        // Buckets must outlive the following bucket, which still reads them.
        let bucket_ttl = self.policy.window_seconds().saturating_mul(2);

        let (current, previous) = match bucket_index.checked_sub(1) {
            Some(previous_index) => {
                let previous_key = key.bucket(previous_index);
                self.store
                    .increment_with_expiry_and_get(
                        current_key.as_str(),
                        bucket_ttl,
                        previous_key.as_str(),
                    )
                    .await?
            }
            None => (
                self.store
                    .increment_with_expiry(current_key.as_str(), bucket_ttl)
                    .await?,
                0,
            ),
        };

        let count = self.policy.sliding_count(
            previous,
            current,
            self.policy.elapsed_in_bucket(epoch_seconds),
        );
        let decision = self.policy.decide(count);
        debug!(
            key = %key,
            current,
            previous,
            count,
            admitted = decision.is_admitted(),
            "sliding window checked"
        );

        Ok(decision)
    }
}
