use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ipnet::IpNet;
use pawguard_application::SlidingWindowLimiter;
use pawguard_domain::{ClientIdentity, Decision, PathExemptions};
use tracing::{debug, info, warn};

use crate::state::AppState;

const RATE_LIMITED_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Too many requests</title>
  </head>
  <body>
    <main>
      <h1>Too many requests</h1>
      <p>You have sent too many requests in the last hour. Please wait a while before trying again.</p>
      <p><a href="/">Back to the home page</a></p>
    </main>
  </body>
</html>
"#;

/// Per-client sliding-window gate in front of general traffic.
pub struct EdgeGate {
    limiter: Option<SlidingWindowLimiter>,
    exemptions: PathExemptions,
    trusted_proxies: Vec<IpNet>,
    check_timeout: Duration,
}

impl EdgeGate {
    /// Without a limiter the gate admits everything.
    pub fn new(
        limiter: Option<SlidingWindowLimiter>,
        exemptions: PathExemptions,
        trusted_proxies: Vec<IpNet>,
        check_timeout: Duration,
    ) -> Self {
        Self {
            limiter,
            exemptions,
            trusted_proxies,
            check_timeout,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

pub async fn edge_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let gate = &state.edge_gate;

    if gate.exemptions.is_exempt(request.uri().path()) {
        debug!(path = %request.uri().path(), "path exempt from rate limiting");
        return next.run(request).await;
    }

    let Some(limiter) = &gate.limiter else {
        return next.run(request).await;
    };

    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let identity = resolve_client_identity(request.headers(), peer_ip, &gate.trusted_proxies);

    match tokio::time::timeout(gate.check_timeout, limiter.check(&identity)).await {
        Ok(Ok(Decision::Admitted { .. })) => next.run(request).await,
        Ok(Ok(Decision::Rejected {
            retry_after_seconds,
        })) => {
            info!(client = %identity, path = %request.uri().path(), "edge rate limit exceeded");
            rate_limited_page(retry_after_seconds)
        }
        Ok(Err(error)) => {
            warn!(client = %identity, %error, "rate limit check failed, admitting request");
            next.run(request).await
        }
        Err(_) => {
            warn!(
                client = %identity,
                timeout_ms = gate.check_timeout.as_millis(),
                "rate limit check timed out, admitting request"
            );
            next.run(request).await
        }
    }
}

/// Picks the identity a request is counted against.
///
/// The connection peer is authoritative unless it is one of the trusted
/// proxies, in which case the first `X-Forwarded-For` entry is used.
/// Requests that cannot be attributed share the anonymous bucket.
pub fn resolve_client_identity(
    headers: &HeaderMap,
    peer_ip: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> ClientIdentity {
    if let Some(peer_ip) = peer_ip
        && !trusted_proxies.iter().any(|network| network.contains(&peer_ip))
    {
        return ClientIdentity::Ip(peer_ip);
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(ClientIdentity::from_forwarded_for)
        .unwrap_or(ClientIdentity::Anonymous)
}

fn rate_limited_page(retry_after_seconds: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::RETRY_AFTER, HeaderValue::from(retry_after_seconds)),
        ],
        RATE_LIMITED_PAGE,
    )
        .into_response()
}
