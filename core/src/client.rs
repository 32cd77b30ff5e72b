//! The shared client and its endpoint functions.
//!
//! # Design
//! `NetToolsClient` is built once and then only read. It owns the
//! configuration, the transport and the notifier; nothing changes per call, so
//! a single value can be shared by reference (or behind an `Arc`) across any
//! number of concurrent calls.
//!
//! A call runs in three steps: `build_request` turns the payload into an
//! `HttpRequest`, the transport executes it under the configured timeout, and
//! `normalize` resolves the outcome. Rejected calls are reported to the
//! notifier before the error is returned. There is no retry and no caching.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::normalize;
use crate::notify::{Notifier, TracingNotifier};
use crate::transport::{Transport, UreqTransport};

pub struct NetToolsClient<T = UreqTransport> {
    config: ClientConfig,
    base_url: String,
    transport: T,
    notifier: Arc<dyn Notifier>,
}

impl NetToolsClient<UreqTransport> {
    /// Client backed by `ureq`, reporting errors through `tracing`.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> NetToolsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config,
            base_url,
            transport,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the request for `path` without sending it.
    ///
    /// Fails only when the payload cannot be serialized.
    pub fn build_request<P: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &P,
    ) -> Result<HttpRequest, TransportError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| TransportError::RequestConfig(Some(e.to_string())))?;
        Ok(HttpRequest {
            method,
            url: self.url_for(path),
            headers: self.config.headers.clone(),
            body: Some(body),
        })
    }

    /// Send `payload` to `path` and normalize the outcome.
    pub async fn send<P: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &P,
    ) -> Result<Value, ApiError> {
        let outcome = match self.build_request(method, path, payload) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => Err(err),
        };

        let result = normalize(outcome);
        if let Err(err) = &result {
            tracing::warn!(
                %method,
                path,
                kind = ?err.kind(),
                status = ?err.status(),
                "request rejected"
            );
            self.notifier.notify_error(err.message());
        }
        result
    }

    pub async fn call<P: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &P,
    ) -> Result<Value, ApiError> {
        self.send(endpoint.method(), endpoint.path(), payload).await
    }

    pub async fn calculate_network<P: Serialize + ?Sized>(
        &self,
        payload: &P,
    ) -> Result<Value, ApiError> {
        self.call(Endpoint::CalculateNetwork, payload).await
    }

    pub async fn summarize_ips<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, ApiError> {
        self.call(Endpoint::SummarizeIps, payload).await
    }

    pub async fn convert_ip<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, ApiError> {
        self.call(Endpoint::ConvertIp, payload).await
    }

    pub async fn format_ip<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, ApiError> {
        self.call(Endpoint::FormatIp, payload).await
    }

    pub async fn divide_subnet<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, ApiError> {
        self.call(Endpoint::DivideSubnet, payload).await
    }

    pub async fn query_ip_location<P: Serialize + ?Sized>(
        &self,
        payload: &P,
    ) -> Result<Value, ApiError> {
        self.call(Endpoint::QueryIpLocation, payload).await
    }

    pub async fn query_dns<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value, ApiError> {
        self.call(Endpoint::QueryDns, payload).await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        match tokio::time::timeout(self.config.timeout, self.transport.execute(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout),
        }
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::error::{
        ErrorKind, Failure, NETWORK_ERROR_MESSAGE, SERVER_ERROR_MESSAGE, TIMEOUT_MESSAGE,
    };
    use crate::notify::RecordingNotifier;

    /// Replays canned outcomes and records every request it sees.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn replying(outcome: Result<HttpResponse, TransportError>) -> Self {
            let transport = Self::default();
            transport.outcomes.lock().unwrap().push_back(outcome);
            transport
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted outcome left")
        }
    }

    /// Never answers.
    struct SilentTransport;

    impl Transport for SilentTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn json_response(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        })
    }

    fn client<T: Transport>(transport: T) -> (NetToolsClient<T>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let client = NetToolsClient::with_transport(
            ClientConfig::new("http://localhost:5000/api"),
            transport,
        )
        .with_notifier(Arc::new(notifier.clone()));
        (client, notifier)
    }

    #[test]
    fn build_request_joins_base_url_and_path() {
        let (client, _) = client(ScriptedTransport::default());
        let req = client
            .build_request(HttpMethod::Post, "/ip/summary", &json!({"ipRanges": ["10.0.0.1"]}))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/api/ip/summary");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"ipRanges": ["10.0.0.1"]}));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = NetToolsClient::with_transport(
            ClientConfig::new("http://localhost:5000/api/"),
            ScriptedTransport::default(),
        );
        let req = client.build_request(HttpMethod::Post, "/dns/query", &json!({})).unwrap();
        assert_eq!(req.url, "http://localhost:5000/api/dns/query");
        let req = client.build_request(HttpMethod::Post, "dns/query", &json!({})).unwrap();
        assert_eq!(req.url, "http://localhost:5000/api/dns/query");
    }

    #[test]
    fn default_base_url_prefixes_once() {
        let client =
            NetToolsClient::with_transport(ClientConfig::default(), ScriptedTransport::default());
        let req = client
            .build_request(HttpMethod::Post, Endpoint::CalculateNetwork.path(), &json!({}))
            .unwrap();
        assert_eq!(req.url, "/api/network/calculate");
    }

    #[tokio::test]
    async fn query_dns_returns_body_verbatim() {
        let transport =
            ScriptedTransport::replying(json_response(200, json!({"records": ["93.184.216.34"]})));
        let (client, notifier) = client(transport);

        let payload = json!({"domain": "example.com", "recordType": "A"});
        let value = client.query_dns(&payload).await.unwrap();

        assert_eq!(value, json!({"records": ["93.184.216.34"]}));
        assert_eq!(payload, json!({"domain": "example.com", "recordType": "A"}));
        assert!(notifier.messages().is_empty());

        let seen = client.transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://localhost:5000/api/dns/query");
        assert_eq!(seen[0].method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn server_error_message_is_notified_and_returned() {
        let transport =
            ScriptedTransport::replying(json_response(400, json!({"error": "invalid cidr"})));
        let (client, notifier) = client(transport);

        let err = client
            .calculate_network(&json!({"cidr": "10.0.0.0/24"}))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "invalid cidr");
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(notifier.messages(), vec!["invalid cidr"]);
        match err.failure() {
            Failure::Response(response) => assert_eq!(response.status, 400),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_without_message_uses_fallback() {
        let transport = ScriptedTransport::replying(json_response(500, json!({})));
        let (client, notifier) = client(transport);

        let err = client.divide_subnet(&json!({"network": "10.0.0.0/8"})).await.unwrap_err();

        assert_eq!(err.message(), SERVER_ERROR_MESSAGE);
        assert_eq!(notifier.messages(), vec![SERVER_ERROR_MESSAGE]);
    }

    #[tokio::test]
    async fn connectivity_failure_is_notified() {
        let transport = ScriptedTransport::replying(Err(TransportError::Connectivity(
            "connection refused".to_string(),
        )));
        let (client, notifier) = client(transport);

        let err = client.query_ip_location(&json!({"ip": "8.8.8.8"})).await.unwrap_err();

        assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(notifier.messages(), vec![NETWORK_ERROR_MESSAGE]);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_backend_times_out_after_configured_duration() {
        let notifier = RecordingNotifier::new();
        let client = NetToolsClient::with_transport(
            ClientConfig::new("http://localhost:5000/api").with_timeout(Duration::from_millis(15_000)),
            SilentTransport,
        )
        .with_notifier(Arc::new(notifier.clone()));

        let started = tokio::time::Instant::now();
        let err = client.summarize_ips(&json!({"ipRanges": ["10.0.0.0/30"]})).await.unwrap_err();

        assert!(started.elapsed() >= Duration::from_millis(15_000));
        assert_eq!(err.message(), TIMEOUT_MESSAGE);
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(notifier.messages(), vec![TIMEOUT_MESSAGE]);
    }

    #[tokio::test]
    async fn unserializable_payload_never_reaches_transport() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("payload refused to serialize"))
            }
        }

        let (client, notifier) = client(ScriptedTransport::default());
        let err = client.convert_ip(&Unserializable).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequestConfig);
        assert_eq!(err.message(), "payload refused to serialize");
        assert_eq!(notifier.messages(), vec!["payload refused to serialize"]);
        assert!(client.transport.seen().is_empty());
    }

    #[tokio::test]
    async fn every_endpoint_posts_to_its_path() {
        let transport = ScriptedTransport::default();
        for _ in Endpoint::ALL {
            transport
                .outcomes
                .lock()
                .unwrap()
                .push_back(json_response(200, json!({"data": null})));
        }
        let (client, _) = client(transport);
        let payload = json!({"ip": "192.168.1.1"});

        client.calculate_network(&payload).await.unwrap();
        client.summarize_ips(&payload).await.unwrap();
        client.convert_ip(&payload).await.unwrap();
        client.format_ip(&payload).await.unwrap();
        client.divide_subnet(&payload).await.unwrap();
        client.query_ip_location(&payload).await.unwrap();
        client.query_dns(&payload).await.unwrap();

        let urls: Vec<String> = client.transport.seen().into_iter().map(|r| r.url).collect();
        let expected: Vec<String> = Endpoint::ALL
            .iter()
            .map(|e| format!("http://localhost:5000/api{}", e.path()))
            .collect();
        assert_eq!(urls, expected);
    }
}
