use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use pawguard_application::CounterStore;
use pawguard_core::AppResult;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// In-process counter store for development and tests.
///
/// A single mutex serialises every operation, so increments are atomic.
/// Counters only live as long as the process.
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: Mutex<HashMap<String, CounterEntry>>,
}

impl InMemoryCounterStore {
    /// Creates an empty counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment_with_expiry(&self, key: &str, seconds: u64) -> AppResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let entry = entries.entry(key.to_owned()).or_insert(CounterEntry {
            count: 0,
            expires_at: None,
        });
        if !entry.is_live(now) {
            *entry = CounterEntry {
                count: 0,
                expires_at: None,
            };
        }

        entry.count = entry.count.saturating_add(1);
        if entry.expires_at.is_none() {
            entry.expires_at = now.checked_add(Duration::from_secs(seconds));
        }
        Ok(entry.count)
    }

    async fn get(&self, key: &str) -> AppResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(entry.count),
            Some(_) => {
                entries.remove(key);
                Ok(0)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
