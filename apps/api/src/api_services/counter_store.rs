use std::sync::Arc;

use pawguard_application::CounterStore;
use pawguard_core::AppError;
use pawguard_infrastructure::{InMemoryCounterStore, RedisCounterStore, RestCounterStore};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, CounterStoreConfig};

use super::http_clients::build_store_http_client;
use super::redis::build_redis_client;

/// Builds the configured store, or `None` when the limiters must stay off.
pub(super) fn build_counter_store(
    config: &ApiConfig,
) -> Result<Option<Arc<dyn CounterStore>>, AppError> {
    let Some(store_config) = &config.counter_store else {
        warn!("counter store credentials missing; rate limiting and password reset disabled");
        return Ok(None);
    };

    let store: Arc<dyn CounterStore> = match store_config {
        CounterStoreConfig::Rest { endpoint, token } => {
            info!(endpoint = %endpoint, "using REST counter store");
            Arc::new(RestCounterStore::new(
                build_store_http_client(config.store_timeout)?,
                endpoint.clone(),
                token.clone(),
            ))
        }
        CounterStoreConfig::Redis { redis_url } => match build_redis_client(redis_url) {
            Ok(client) => {
                info!("using redis counter store");
                Arc::new(RedisCounterStore::new(client, config.store_timeout))
            }
            Err(error) => {
                warn!(%error, "ignoring invalid redis counter store configuration");
                return Ok(None);
            }
        },
        CounterStoreConfig::InMemory => {
            warn!("using in-memory counter store; counters are per process and lost on restart");
            Arc::new(InMemoryCounterStore::new())
        }
    };

    Ok(Some(store))
}
