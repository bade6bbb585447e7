use std::time::Duration;

use pawguard_core::AppError;

const IDENTITY_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const APP_ORIGIN_TIMEOUT: Duration = Duration::from_secs(30);

pub(super) fn build_store_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| {
            AppError::Internal(format!("failed to build counter store http client: {error}"))
        })
}

pub(super) fn build_identity_provider_http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(IDENTITY_PROVIDER_TIMEOUT)
        .build()
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to build identity provider http client: {error}"
            ))
        })
}

pub(super) fn build_forwarding_http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(APP_ORIGIN_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|error| {
            AppError::Internal(format!("failed to build forwarding http client: {error}"))
        })
}
