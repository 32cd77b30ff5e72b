//! Typed payloads for the backend's endpoints.
//!
//! # Design
//! The client accepts any `Serialize` payload and returns the success body as
//! a raw `serde_json::Value`. These DTOs mirror the field names the backend
//! reads and writes, for callers that prefer types over ad-hoc JSON. Nothing
//! here is validated; the backend owns that.
//!
//! Successful responses are wrapped by the backend as `{"data": ...}`.
//! `decode_data` unwraps and deserializes that envelope on request; the client
//! itself never does.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `/network/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkCalcRequest {
    pub ip: String,
    /// Dotted netmask (`255.255.255.0`) or prefix length (`24`).
    pub mask: String,
}

/// Body of `/ip/summary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub ip_ranges: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConvertDirection {
    #[serde(rename = "v4tov6")]
    V4ToV6,
    #[serde(rename = "v6tov4")]
    V6ToV4,
}

/// Body of `/ip/convert`. `ipv6_prefix` is only sent for IPv4 to IPv6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub direction: ConvertDirection,
    pub ips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_prefix: Option<String>,
}

/// Body of `/ip/location`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpLocationRequest {
    pub ip: String,
}

/// Body of `/dns/query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsQueryRequest {
    pub domain: String,
    pub record_type: String,
}

/// `{"data": T}` as returned by the backend on success.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Result of `/network/calculate`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NetworkInfo {
    pub is_private: bool,
    pub network: String,
    pub network_cidr: String,
    pub network_address: String,
    pub broadcast_address: String,
    pub total_ips: u128,
    pub usable_ips: i128,
    pub first_usable: String,
    pub last_usable: String,
    pub prefix_length: u8,
    pub netmask: String,
    pub hostmask: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    pub ttl: u32,
}

/// Records of one type, as returned by `/dns/query`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DnsRecordSet {
    #[serde(rename = "type")]
    pub record_type: String,
    pub records: Vec<DnsRecord>,
}

/// Deserialize the `data` field of a success value.
pub fn decode_data<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value::<DataEnvelope<T>>(value).map(|envelope| envelope.data)
}
