//! Redis-backed counter store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pawguard_application::CounterStore;
use pawguard_core::{AppError, AppResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

const INCREMENT_WITH_EXPIRY_SCRIPT: &str = r#"
local key = KEYS[1]
local ttl_seconds = tonumber(ARGV[1])

local count = redis.call('INCR', key)
if redis.call('TTL', key) < 0 then
  redis.call('EXPIRE', key, ttl_seconds)
end

return count
"#;

const INCREMENT_WITH_EXPIRY_AND_GET_SCRIPT: &str = r#"
local key = KEYS[1]
local peek_key = KEYS[2]
local ttl_seconds = tonumber(ARGV[1])

local count = redis.call('INCR', key)
if redis.call('TTL', key) < 0 then
  redis.call('EXPIRE', key, ttl_seconds)
end

local peeked = tonumber(redis.call('GET', peek_key) or '0')
return {count, peeked}
"#;

/// Redis implementation of the counter store port.
///
/// Every operation, connection setup included, is bounded by
/// `operation_timeout`.
#[derive(Clone)]
pub struct RedisCounterStore {
    client: redis::Client,
    operation_timeout: Duration,
}

impl RedisCounterStore {
    /// Creates a store adapter with a configured Redis client.
    #[must_use]
    pub fn new(client: redis::Client, operation_timeout: Duration) -> Self {
        Self {
            client,
            operation_timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: &str, future: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        tokio::time::timeout(self.operation_timeout, future)
            .await
            .map_err(|_| {
                AppError::StoreUnavailable(format!(
                    "redis {operation} timed out after {} ms",
                    self.operation_timeout.as_millis()
                ))
            })?
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                AppError::StoreUnavailable(format!("failed to connect to redis: {error}"))
            })
    }
}

fn expiry_seconds(seconds: u64) -> AppResult<i64> {
    i64::try_from(seconds)
        .map_err(|error| AppError::Validation(format!("invalid redis expiry seconds: {error}")))
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_with_expiry(&self, key: &str, seconds: u64) -> AppResult<u64> {
        let ttl_seconds = expiry_seconds(seconds)?;

        self.bounded("INCR/EXPIRE script", async {
            let mut connection = self.connection().await?;
            let script = Script::new(INCREMENT_WITH_EXPIRY_SCRIPT);
            let count: u64 = script
                .key(key)
                .arg(ttl_seconds)
                .invoke_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::StoreUnavailable(format!(
                        "failed to increment redis counter: {error}"
                    ))
                })?;

            Ok(count)
        })
        .await
    }

    async fn get(&self, key: &str) -> AppResult<u64> {
        self.bounded("GET", async {
            let mut connection = self.connection().await?;
            connection
                .get::<_, Option<u64>>(key)
                .await
                .map(Option::unwrap_or_default)
                .map_err(|error| {
                    AppError::StoreUnavailable(format!("failed to read redis counter: {error}"))
                })
        })
        .await
    }

    async fn ping(&self) -> AppResult<()> {
        self.bounded("PING", async {
            let mut connection = self.connection().await?;
            let reply = connection.ping::<String>().await.map_err(|error| {
                AppError::StoreUnavailable(format!("redis ping failed: {error}"))
            })?;

            if reply.eq_ignore_ascii_case("pong") {
                Ok(())
            } else {
                Err(AppError::StoreUnavailable(format!(
                    "unexpected redis ping response: {reply}"
                )))
            }
        })
        .await
    }

    async fn increment_with_expiry_and_get(
        &self,
        key: &str,
        seconds: u64,
        peek_key: &str,
    ) -> AppResult<(u64, u64)> {
        let ttl_seconds = expiry_seconds(seconds)?;

        self.bounded("INCR/EXPIRE/GET script", async {
            let mut connection = self.connection().await?;
            let script = Script::new(INCREMENT_WITH_EXPIRY_AND_GET_SCRIPT);
            let (incremented, peeked): (u64, u64) = script
                .key(key)
                .key(peek_key)
                .arg(ttl_seconds)
                .invoke_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::StoreUnavailable(format!(
                        "failed to run redis counter script: {error}"
                    ))
                })?;

            Ok((incremented, peeked))
        })
        .await
    }
}
