//! Async client core for the nettools IP/network calculation service.
//!
//! # Overview
//! Every backend capability is a POST of a JSON payload to a path under one
//! configured base URL. `NetToolsClient` sends the payload, waits at most the
//! configured timeout, and resolves the outcome to either the response body or
//! an `ApiError` carrying one user-facing message.
//!
//! # Design
//! - Host-does-IO split: `NetToolsClient::build_request` and `normalize` are
//!   pure; only a `Transport` touches the network. `UreqTransport` is the
//!   default, tests substitute their own.
//! - Failures are classified in a fixed order: server responded, no response
//!   (timeout or connectivity), never sent. See `normalize`.
//! - Each rejected call is reported once to a `Notifier` and also returned.
//! - The client is configured once and never mutated afterwards.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod normalize;
pub mod notify;
pub mod routes;
pub mod transport;
pub mod types;

pub use client::NetToolsClient;
pub use config::{ClientConfig, ConfigError, Profile};
pub use endpoint::Endpoint;
pub use error::{ApiError, ErrorKind, Failure, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::normalize;
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use routes::{Route, View};
pub use transport::{Transport, UreqTransport};
