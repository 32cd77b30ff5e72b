//! Scriptable stand-in for the nettools backend, plus the development proxy.
//!
//! The backend answers every POST from a per-path script and records what it
//! received, so tests can check both the client's normalization and that
//! payloads arrive untouched. A path can also be told to stall forever.

pub mod proxy;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use proxy::{proxy_app, run_proxy, DevProxy};

/// One scripted reply. A `null` body is sent as an empty body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canned {
    pub status: u16,
    #[serde(default)]
    pub body: Value,
    /// Accept the request and never answer.
    #[serde(default)]
    pub stall: bool,
}

/// A request as seen by the mock backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Received {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl Received {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub type Script = HashMap<String, Canned>;

#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<RwLock<Script>>,
    received: Arc<RwLock<Vec<Received>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(RwLock::new(script)),
            received: Arc::default(),
        }
    }

    /// Answer `path` with `status` and a JSON `body`.
    pub async fn respond(&self, path: &str, status: u16, body: Value) {
        self.script.write().await.insert(
            path.to_string(),
            Canned {
                status,
                body,
                stall: false,
            },
        );
    }

    /// Never answer requests to `path`.
    pub async fn stall(&self, path: &str) {
        self.script.write().await.insert(
            path.to_string(),
            Canned {
                status: 200,
                body: Value::Null,
                stall: true,
            },
        );
    }

    pub async fn received(&self) -> Vec<Received> {
        self.received.read().await.clone()
    }
}

pub fn app(backend: MockBackend) -> Router {
    Router::new().fallback(handle).with_state(backend)
}

pub async fn run(listener: TcpListener, backend: MockBackend) -> Result<(), std::io::Error> {
    axum::serve(listener, app(backend)).await
}

async fn handle(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let body = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    backend.received.write().await.push(Received {
        method: method.to_string(),
        path: path.clone(),
        headers,
        body,
    });

    let canned = backend.script.read().await.get(&path).cloned();
    let Some(canned) = canned else {
        tracing::debug!(%method, path = %path, "no scripted response");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no mock response for {path}") })),
        )
            .into_response();
    };

    if canned.stall {
        tracing::debug!(%method, path = %path, "stalling");
        return std::future::pending::<Response>().await;
    }

    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match canned.body {
        Value::Null => status.into_response(),
        body => (status, Json(body)).into_response(),
    }
}
