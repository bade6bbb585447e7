use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use pawguard_core::AppError;

use crate::dto::{GenericMessageResponse, PasswordResetRequest};
use crate::error::ApiResult;
use crate::state::AppState;

const RESET_SENT_MESSAGE: &str =
    "If an account exists for this email, a password reset link has been sent.";

/// Rate-limited password reset.
///
/// Configuration is checked before the body so that a misconfigured
/// deployment answers 500 for every request.
pub async fn password_reset_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<GenericMessageResponse>> {
    let service = state.password_reset_service.as_ref().ok_or_else(|| {
        AppError::ConfigurationMissing(
            "password reset needs counter store and identity provider credentials".to_owned(),
        )
    })?;

    let payload = serde_json::from_slice::<PasswordResetRequest>(&body)
        .map_err(|_| AppError::Validation("invalid JSON body".to_owned()))?;

    service.request_reset(&payload.email).await?;

    Ok(Json(GenericMessageResponse {
        message: RESET_SENT_MESSAGE.to_owned(),
    }))
}
