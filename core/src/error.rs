//! Error types for the nettools client.
//!
//! # Design
//! A call can fail in three mutually exclusive ways. The server answered with
//! a non-2xx status (`Failure::Response`), the request went out but nothing
//! came back (`TransportError::Timeout` / `TransportError::Connectivity`), or
//! the request never left (`TransportError::RequestConfig`). `ApiError` pairs
//! the user-facing message chosen by `normalize` with that original failure so
//! callers can still inspect status codes and bodies.

use thiserror::Error;

use crate::http::HttpResponse;

/// Shown when the server rejects a request without an `error` field.
pub const SERVER_ERROR_MESSAGE: &str = "服务器响应错误";

/// Shown when no response arrives within the configured timeout.
pub const TIMEOUT_MESSAGE: &str = "请求超时，请重试";

/// Shown when the request was sent but the connection failed.
pub const NETWORK_ERROR_MESSAGE: &str = "网络请求失败，请检查网络连接";

/// Shown when a request could not be dispatched and the cause has no message.
pub const REQUEST_CONFIG_MESSAGE: &str = "请求配置错误";

/// A failure below HTTP: no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The configured timeout elapsed before the server responded.
    #[error("request timed out")]
    Timeout,

    /// The request was sent but no response arrived.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// The request could not be built or dispatched.
    #[error("request could not be dispatched: {}", .0.as_deref().unwrap_or("unknown cause"))]
    RequestConfig(Option<String>),
}

/// The original failure behind an `ApiError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The server responded with a non-2xx status.
    Response(HttpResponse),
    /// No response was received.
    Transport(TransportError),
}

/// Classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Server,
    Timeout,
    Connectivity,
    RequestConfig,
}

impl ErrorKind {
    /// Timeout and connectivity failures both mean "sent, nothing came back".
    pub fn is_network(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Connectivity)
    }
}

/// A rejected call: the resolved user-facing message plus the failure it was
/// derived from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    failure: Failure,
}

impl ApiError {
    pub(crate) fn new(message: impl Into<String>, failure: Failure) -> Self {
        Self {
            message: message.into(),
            failure,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn into_failure(self) -> Failure {
        self.failure
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.failure {
            Failure::Response(_) => ErrorKind::Server,
            Failure::Transport(TransportError::Timeout) => ErrorKind::Timeout,
            Failure::Transport(TransportError::Connectivity(_)) => ErrorKind::Connectivity,
            Failure::Transport(TransportError::RequestConfig(_)) => ErrorKind::RequestConfig,
        }
    }

    /// HTTP status of the rejecting response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match &self.failure {
            Failure::Response(response) => Some(response.status),
            Failure::Transport(_) => None,
        }
    }
}
