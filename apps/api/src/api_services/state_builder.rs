use std::sync::Arc;

use pawguard_application::{AccountRecoveryGateway, PasswordResetService, SlidingWindowLimiter};
use pawguard_core::AppError;
use pawguard_domain::{DEFAULT_EXEMPT_EXTENSIONS, PathExemptions};
use pawguard_infrastructure::HttpAccountRecoveryGateway;
use tracing::warn;

use crate::api_config::ApiConfig;
use crate::handlers::forward::UpstreamForwarder;
use crate::middleware::EdgeGate;
use crate::state::AppState;

use super::counter_store::build_counter_store;
use super::http_clients::{build_forwarding_http_client, build_identity_provider_http_client};

pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let counter_store = build_counter_store(config)?;
    let recovery_gateway = build_recovery_gateway(config)?;

    let limiter = counter_store.clone().map(|store| {
        SlidingWindowLimiter::new(store, config.key_namespace.clone(), config.edge_policy)
    });
    let edge_gate = EdgeGate::new(
        limiter,
        PathExemptions::new(
            config.exempt_prefixes.iter().cloned(),
            DEFAULT_EXEMPT_EXTENSIONS.iter().copied(),
        ),
        config.trusted_proxies.clone(),
        config.store_timeout,
    );

    let password_reset_service = match (&counter_store, &recovery_gateway) {
        (Some(store), Some(gateway)) => {
            Some(PasswordResetService::new(store.clone(), gateway.clone()))
        }
        _ => {
            warn!("password reset disabled until store and identity provider are configured");
            None
        }
    };

    Ok(AppState {
        edge_gate: Arc::new(edge_gate),
        password_reset_service,
        counter_store,
        identity_provider_configured: recovery_gateway.is_some(),
        store_timeout: config.store_timeout,
        forwarder: Arc::new(UpstreamForwarder::new(
            build_forwarding_http_client()?,
            config.app_origin_url.clone(),
        )),
    })
}

fn build_recovery_gateway(
    config: &ApiConfig,
) -> Result<Option<Arc<dyn AccountRecoveryGateway>>, AppError> {
    let Some(provider) = &config.identity_provider else {
        return Ok(None);
    };

    let gateway = HttpAccountRecoveryGateway::new(
        build_identity_provider_http_client()?,
        &provider.base_url,
        provider.api_key.clone(),
        provider.redirect_to.as_deref(),
    )?;

    Ok(Some(Arc::new(gateway)))
}
