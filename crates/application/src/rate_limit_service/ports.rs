use async_trait::async_trait;

use pawguard_core::AppResult;

/// Port for a key-value store with atomic increment and expiry.
///
/// Implementations must serialise concurrent increments of one key so that
/// no update is lost. Failures surface as `AppError::StoreUnavailable`.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments the counter for `key`, creating it at zero when
    /// absent, and returns the new value.
    ///
    /// Whenever the counter has no time-to-live after the increment it gets
    /// `seconds`, in the same atomic step. An existing time-to-live is left
    /// alone, so a counter whose expiry was never applied is repaired on its
    /// next increment.
    async fn increment_with_expiry(&self, key: &str, seconds: u64) -> AppResult<u64>;

    /// Reads the counter for `key`, returning zero when absent or expired.
    async fn get(&self, key: &str) -> AppResult<u64>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Runs [`CounterStore::increment_with_expiry`] on `key` and reads
    /// `peek_key` in one round trip.
    ///
    /// The default issues two calls; adapters with scripting or pipelining
    /// override it.
    async fn increment_with_expiry_and_get(
        &self,
        key: &str,
        seconds: u64,
        peek_key: &str,
    ) -> AppResult<(u64, u64)> {
        let incremented = self.increment_with_expiry(key, seconds).await?;
        let peeked = self.get(peek_key).await?;
        Ok((incremented, peeked))
    }
}
