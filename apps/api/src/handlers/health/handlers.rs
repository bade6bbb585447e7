use super::checks::{check_counter_store, check_identity_provider};
use super::*;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let counter_store =
        check_counter_store(state.counter_store.clone(), state.store_timeout).await;
    let identity_provider = check_identity_provider(state.identity_provider_configured);

    // `disabled` keeps the service ready.
    let ready = counter_store.status != "error";
    let status = if ready { "ok" } else { "degraded" };
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            ready,
            counter_store,
            identity_provider,
        }),
    )
}
