//! Executing `HttpRequest`s.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. The client wraps every
//! `execute` in its own timeout, so an implementation only has to report what
//! happened: a response (any status), or a `TransportError` saying why there
//! is none. Non-2xx statuses are data here, not errors.
//!
//! `UreqTransport` runs the blocking `ureq` agent on tokio's blocking pool so
//! callers suspend instead of blocking their task.

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// `ureq`-backed transport.
///
/// The agent is built with the client's timeout as a global deadline and with
/// `http_status_as_error(false)`, so 4xx/5xx come back as responses for the
/// normalizer to classify.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Perform the round-trip on the current thread.
    pub fn execute_blocking(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        if !has_origin(&url) {
            return Err(TransportError::RequestConfig(Some(format!(
                "request URL {url:?} has no scheme and host; configure an absolute base URL"
            ))));
        }

        let builder = match method {
            HttpMethod::Post => with_headers(self.agent.post(&url), &headers),
        };
        let result = match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        };

        let mut response = result.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = match read_body(response.body_mut()) {
            Ok(body) => body,
            // The status line arrived, so a rejection is still the server's.
            Err(err) if !(200..300).contains(&status) => {
                tracing::debug!(status, error = %err, "discarding unreadable error body");
                String::new()
            }
            // A 2xx without its payload is not a usable success.
            Err(err) => return Err(classify(err)),
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let transport = self.clone();
        tokio::task::spawn_blocking(move || transport.execute_blocking(request))
            .await
            .unwrap_or_else(|err| {
                Err(TransportError::Connectivity(format!(
                    "transport worker failed: {err}"
                )))
            })
    }
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

/// Whole body, without ureq's default size cap. Invalid UTF-8 is replaced.
fn read_body(body: &mut ureq::Body) -> Result<String, ureq::Error> {
    let bytes = body.with_config().limit(u64::MAX).read_to_vec()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn has_origin(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.len() > scheme.len()
            && url
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Map a `ureq` failure onto "never sent" versus "sent, no response".
fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
            TransportError::RequestConfig(Some(err.to_string()))
        }
        other => TransportError::Connectivity(other.to_string()),
    }
}
