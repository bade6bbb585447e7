//! Account recovery through the identity provider's HTTP API.

use async_trait::async_trait;
use pawguard_application::AccountRecoveryGateway;
use pawguard_core::{AppError, AppResult};
use pawguard_domain::EmailAddress;
use reqwest::header;
use serde_json::Value;
use tracing::warn;
use url::Url;

/// Status reported when the identity provider cannot be reached at all.
const UNREACHABLE_STATUS: u16 = 502;

/// HTTP implementation of the account recovery port.
///
/// Posts `{ "email": ... }` to `<base_url>/auth/v1/recover`, authenticating
/// with the provider API key both as `apikey` header and bearer token.
#[derive(Clone)]
pub struct HttpAccountRecoveryGateway {
    http_client: reqwest::Client,
    recover_url: Url,
    api_key: String,
}

impl HttpAccountRecoveryGateway {
    /// Creates a gateway for one identity provider.
    ///
    /// `redirect_to`, when set, is forwarded so recovery links land on the
    /// application's reset page.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &Url,
        api_key: impl Into<String>,
        redirect_to: Option<&str>,
    ) -> AppResult<Self> {
        let mut recover_url = base_url.clone();
        recover_url
            .path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "identity provider URL '{base_url}' cannot carry a path"
                ))
            })?
            .pop_if_empty()
            .extend(["auth", "v1", "recover"]);

        if let Some(redirect_to) = redirect_to.filter(|value| !value.trim().is_empty()) {
            recover_url
                .query_pairs_mut()
                .append_pair("redirect_to", redirect_to);
        }

        Ok(Self {
            http_client,
            recover_url,
            api_key: api_key.into(),
        })
    }

    /// Returns the fully resolved recovery endpoint.
    #[must_use]
    pub fn recover_url(&self) -> &Url {
        &self.recover_url
    }
}

/// Pulls a human readable message out of a provider error body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| {
            ["msg", "message", "error_description", "error"]
                .into_iter()
                .find_map(|field| payload.get(field).and_then(Value::as_str).map(str::to_owned))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| "password reset request failed".to_owned())
}

#[async_trait]
impl AccountRecoveryGateway for HttpAccountRecoveryGateway {
    async fn send_recovery_email(&self, email: &EmailAddress) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.recover_url.clone())
            .header("apikey", self.api_key.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "email": email.as_str() }))
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "identity provider unreachable");
                AppError::Upstream {
                    status: UNREACHABLE_STATUS,
                    message: "identity provider unavailable".to_owned(),
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Upstream {
            status: status.as_u16(),
            message: upstream_message(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use pawguard_application::AccountRecoveryGateway;
    use pawguard_core::AppError;
    use pawguard_domain::EmailAddress;
    use serde_json::{Value, json};
    use url::Url;

    use super::{HttpAccountRecoveryGateway, upstream_message};

    #[derive(Default)]
    struct ProviderState {
        received: Mutex<Vec<(Option<String>, Option<String>, Value)>>,
    }

    async fn recover_handler(
        State(state): State<Arc<ProviderState>>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let api_key = headers
            .get("apikey")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if let Ok(mut received) = state.received.lock() {
            received.push((api_key.clone(), query, body.clone()));
        }

        if api_key.as_deref() != Some("provider-key") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid API key" })),
            )
                .into_response();
        }

        if body.get("email").and_then(Value::as_str) == Some("blocked@grooming.example") {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "msg": "email rate limit exceeded" })),
            )
                .into_response();
        }

        Json(json!({})).into_response()
    }

    async fn spawn_provider() -> (Url, Arc<ProviderState>) {
        let state = Arc::new(ProviderState::default());
        let router = Router::new()
            .route("/auth/v1/recover", post(recover_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await;
        let listener = listener.unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let url = Url::parse(&format!("http://{address}")).unwrap_or_else(|_| unreachable!());
        (url, state)
    }

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn recover_url_appends_path_and_redirect() {
        let base = Url::parse("https://id.grooming.example/").unwrap_or_else(|_| unreachable!());
        let gateway = HttpAccountRecoveryGateway::new(
            reqwest::Client::new(),
            &base,
            "key",
            Some("https://app.grooming.example/reset-password"),
        );
        assert!(gateway.is_ok());
        assert_eq!(
            gateway.unwrap_or_else(|_| unreachable!()).recover_url().as_str(),
            "https://id.grooming.example/auth/v1/recover?redirect_to=https%3A%2F%2Fapp.grooming.example%2Freset-password"
        );
    }

    #[test]
    fn upstream_message_prefers_known_fields() {
        assert_eq!(upstream_message(r#"{"msg":"slow down"}"#), "slow down");
        assert_eq!(
            upstream_message(r#"{"error":"invalid_grant","error_description":"bad"}"#),
            "bad"
        );
        assert_eq!(upstream_message("<html>"), "password reset request failed");
    }

    #[tokio::test]
    async fn successful_recovery_sends_key_and_email() {
        let (url, state) = spawn_provider().await;
        let gateway = HttpAccountRecoveryGateway::new(
            reqwest::Client::new(),
            &url,
            "provider-key",
            Some("https://app.grooming.example/reset"),
        )
        .unwrap_or_else(|_| unreachable!());

        let result = gateway
            .send_recovery_email(&email("owner@grooming.example"))
            .await;
        assert!(result.is_ok());

        let received = state
            .received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0.as_deref(), Some("provider-key"));
        assert!(
            received[0]
                .1
                .as_deref()
                .is_some_and(|query| query.starts_with("redirect_to="))
        );
        assert_eq!(received[0].2, json!({ "email": "owner@grooming.example" }));
    }

    #[tokio::test]
    async fn provider_errors_keep_status_and_message() {
        let (url, _state) = spawn_provider().await;
        let gateway =
            HttpAccountRecoveryGateway::new(reqwest::Client::new(), &url, "provider-key", None)
                .unwrap_or_else(|_| unreachable!());

        let result = gateway
            .send_recovery_email(&email("blocked@grooming.example"))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Upstream { status: 429, ref message }) if message == "email rate limit exceeded"
        ));
    }

    #[tokio::test]
    async fn wrong_api_key_surfaces_unauthorized() {
        let (url, _state) = spawn_provider().await;
        let gateway =
            HttpAccountRecoveryGateway::new(reqwest::Client::new(), &url, "stale-key", None)
                .unwrap_or_else(|_| unreachable!());

        let result = gateway
            .send_recovery_email(&email("owner@grooming.example"))
            .await;
        assert!(matches!(result, Err(AppError::Upstream { status: 401, .. })));
    }
}
