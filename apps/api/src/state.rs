use std::sync::Arc;
use std::time::Duration;

use pawguard_application::{CounterStore, PasswordResetService};

use crate::handlers::forward::UpstreamForwarder;
use crate::middleware::EdgeGate;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub edge_gate: Arc<EdgeGate>,
    /// `None` when the store or identity provider credentials are missing.
    pub password_reset_service: Option<PasswordResetService>,
    pub counter_store: Option<Arc<dyn CounterStore>>,
    pub identity_provider_configured: bool,
    pub store_timeout: Duration,
    pub forwarder: Arc<UpstreamForwarder>,
}
