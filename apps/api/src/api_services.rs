mod counter_store;
mod http_clients;
mod redis;
mod state_builder;

pub use state_builder::build_app_state;
