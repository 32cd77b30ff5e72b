//! Response normalization.
//!
//! Every transport outcome becomes either the success payload or an
//! `ApiError` with exactly one user-facing message. Callers never look at
//! status codes to decide success.
//!
//! Failures are classified in a fixed order: a received response first, then
//! a missing response (timeout before connectivity), then a request that never
//! left. Each branch has its own fallback message.

use serde_json::Value;

use crate::error::{
    ApiError, Failure, TransportError, NETWORK_ERROR_MESSAGE, REQUEST_CONFIG_MESSAGE,
    SERVER_ERROR_MESSAGE, TIMEOUT_MESSAGE,
};
use crate::http::HttpResponse;

/// Resolve a transport outcome into the caller-facing result.
pub fn normalize(outcome: Result<HttpResponse, TransportError>) -> Result<Value, ApiError> {
    match outcome {
        Ok(response) if response.is_success() => Ok(success_payload(&response.body)),
        Ok(response) => {
            let message = server_message(&response.body);
            Err(ApiError::new(message, Failure::Response(response)))
        }
        Err(err) => {
            let message = match &err {
                TransportError::Timeout => TIMEOUT_MESSAGE.to_string(),
                TransportError::Connectivity(_) => NETWORK_ERROR_MESSAGE.to_string(),
                TransportError::RequestConfig(cause) => cause
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(REQUEST_CONFIG_MESSAGE)
                    .to_string(),
            };
            Err(ApiError::new(message, Failure::Transport(err)))
        }
    }
}

/// The body as-is. An empty body is `null`; a body that is not JSON is kept as
/// a JSON string.
fn success_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// `body.error` when present and non-empty, otherwise the fixed fallback.
fn server_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|v| v.get("error")) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => SERVER_ERROR_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}
