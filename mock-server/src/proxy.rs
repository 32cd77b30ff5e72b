//! Development proxy.
//!
//! Forwards every request whose path starts with `prefix` to `target`,
//! keeping the path unchanged (`/api/ip/summary` goes to
//! `{target}/api/ip/summary`). With `change_origin` the upstream sees the
//! target's own authority as `Host`; without it the browser-facing `Host` is
//! passed through. Redirects are handed back to the caller unfollowed.
//! Upstream failures come back as `502 {"error": ...}`.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

pub const DEFAULT_PREFIX: &str = "/api";
pub const DEFAULT_TARGET: &str = "http://localhost:5000";

/// Deadline for one upstream round-trip, body included.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection-scoped headers that must not be forwarded.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::HOST,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
    header::PROXY_AUTHORIZATION,
    header::PROXY_AUTHENTICATE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevProxy {
    pub prefix: String,
    pub target: String,
    pub change_origin: bool,
}

impl Default for DevProxy {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            target: DEFAULT_TARGET.to_string(),
            change_origin: true,
        }
    }
}

impl DevProxy {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }

    /// Upstream URL for `path_and_query`, or `None` if it is not proxied.
    pub fn forward_url(&self, path_and_query: &str) -> Option<String> {
        let path = path_and_query.split('?').next().unwrap_or(path_and_query);
        self.matches(path)
            .then(|| format!("{}{path_and_query}", self.target.trim_end_matches('/')))
    }

    /// `host[:port]` of the target.
    pub fn target_authority(&self) -> Option<&str> {
        let rest = self.target.split_once("://").map(|(_, rest)| rest)?;
        let authority = rest.split(['/', '?']).next().unwrap_or(rest);
        (!authority.is_empty()).then_some(authority)
    }

    /// Headers to send upstream: hop-by-hop headers removed, `Host` chosen by
    /// `change_origin`.
    fn upstream_headers(&self, incoming: &HeaderMap) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = incoming
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(*name))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        if !self.change_origin {
            if let Some(host) = incoming.get(header::HOST).and_then(|v| v.to_str().ok()) {
                headers.push((header::HOST.as_str().to_string(), host.to_string()));
            }
        }
        headers
    }
}

#[derive(Clone)]
struct ProxyState {
    proxy: DevProxy,
    agent: ureq::Agent,
}

pub fn proxy_app(proxy: DevProxy) -> Router {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .timeout_global(Some(UPSTREAM_TIMEOUT))
        .build()
        .new_agent();
    Router::new()
        .fallback(forward)
        .with_state(ProxyState { proxy, agent })
}

pub async fn run_proxy(listener: TcpListener, proxy: DevProxy) -> Result<(), std::io::Error> {
    axum::serve(listener, proxy_app(proxy)).await
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let Some(url) = state.proxy.forward_url(&path_and_query) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("{} is not under {}", uri.path(), state.proxy.prefix),
        );
    };

    let upstream_headers = state.proxy.upstream_headers(&headers);
    tracing::debug!(%method, %url, "proxying");

    let agent = state.agent.clone();
    let result = tokio::task::spawn_blocking(move || {
        forward_blocking(&agent, &method, &url, &upstream_headers, &body)
    })
    .await;

    match result {
        Ok(Ok(response)) => response,
        Ok(Err(message)) => {
            tracing::warn!(%message, "upstream request failed");
            error_response(StatusCode::BAD_GATEWAY, message)
        }
        Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn forward_blocking(
    agent: &ureq::Agent,
    method: &Method,
    url: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> Result<Response, String> {
    let result = match *method {
        Method::GET => with_headers(agent.get(url), headers).call(),
        Method::DELETE => with_headers(agent.delete(url), headers).call(),
        Method::HEAD => with_headers(agent.head(url), headers).call(),
        Method::POST => with_headers(agent.post(url), headers).send(body),
        Method::PUT => with_headers(agent.put(url), headers).send(body),
        Method::PATCH => with_headers(agent.patch(url), headers).send(body),
        _ => return Err(format!("method {method} is not proxied")),
    };
    let mut upstream = result.map_err(|e| e.to_string())?;

    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if !HOP_BY_HOP.contains(name) {
            builder = builder.header(name.as_str(), value.as_bytes());
        }
    }
    let bytes = upstream
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| e.to_string())?;
    builder.body(Body::from(bytes)).map_err(|e| e.to_string())
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
