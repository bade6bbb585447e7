//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_account_recovery_gateway;
mod in_memory_counter_store;
mod redis_counter_store;
mod rest_counter_store;

pub use http_account_recovery_gateway::HttpAccountRecoveryGateway;
pub use in_memory_counter_store::InMemoryCounterStore;
pub use redis_counter_store::RedisCounterStore;
pub use rest_counter_store::RestCounterStore;
