use std::net::{IpAddr, SocketAddr};

use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use axum::response::Response;
use pawguard_core::AppError;
use tracing::warn;
use url::Url;

use crate::error::ApiResult;
use crate::state::AppState;

const MAX_FORWARDED_BODY_BYTES: usize = 10 * 1024 * 1024;
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Relays admitted requests to the application origin.
pub struct UpstreamForwarder {
    http_client: reqwest::Client,
    origin: Url,
}

impl UpstreamForwarder {
    /// `http_client` should not follow redirects; they are relayed as-is.
    pub fn new(http_client: reqwest::Client, origin: Url) -> Self {
        Self {
            http_client,
            origin,
        }
    }

    fn target_url(&self, uri: &Uri) -> Url {
        let mut url = self.origin.clone();
        url.set_path(uri.path());
        url.set_query(uri.query());
        url
    }
}

pub async fn forward_handler(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Response> {
    let forwarder = &state.forwarder;
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_FORWARDED_BODY_BYTES)
        .await
        .map_err(|error| AppError::Validation(format!("request body rejected: {error}")))?;

    let mut headers = end_to_end_headers(&parts.headers);
    if let Some(peer_ip) = peer_ip {
        append_forwarded_for(&mut headers, peer_ip);
    }

    let target_url = forwarder.target_url(&parts.uri);
    let upstream = forwarder
        .http_client
        .request(parts.method, target_url.clone())
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|error| {
            warn!(%error, url = %target_url, "failed to reach application origin");
            AppError::Upstream {
                status: 502,
                message: "application unavailable".to_owned(),
            }
        })?;

    let status = upstream.status();
    let headers = end_to_end_headers(upstream.headers());
    let body = upstream.bytes().await.map_err(|error| {
        warn!(%error, url = %target_url, "failed to read application response");
        AppError::Upstream {
            status: 502,
            message: "application unavailable".to_owned(),
        }
    })?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "host"
            | "content-length"
    )
}

fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn append_forwarded_for(headers: &mut HeaderMap, peer_ip: IpAddr) {
    let value = match headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
    {
        Some(existing) => format!("{existing}, {peer_ip}"),
        None => peer_ip.to_string(),
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
