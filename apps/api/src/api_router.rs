use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use pawguard_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


/// Builds the public router.
///
/// `/health` and the password reset endpoint sit outside the edge gate; the
/// reset endpoint carries its own per-email limiter. Everything else passes
/// the gate and is forwarded to the application origin.
pub fn build_router(app_state: AppState, allowed_origins: &[String]) -> Result<Router, AppError> {
    let password_reset_routes = Router::new()
        .route(
            "/auth/password-reset",
            post(handlers::password_reset::password_reset_handler),
        )
        .layer(cors::build_cors_layer(allowed_origins)?);

    let gated_routes = Router::new()
        .fallback(handlers::forward::forward_handler)
        .layer(from_fn_with_state(app_state.clone(), middleware::edge_gate));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(password_reset_routes)
        .merge(gated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
