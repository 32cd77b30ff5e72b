//! Backend capabilities and their fixed paths.

use crate::http::HttpMethod;

/// One backend capability. Every endpoint is a POST to a path relative to the
/// configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CalculateNetwork,
    SummarizeIps,
    ConvertIp,
    FormatIp,
    DivideSubnet,
    QueryIpLocation,
    QueryDns,
}

impl Endpoint {
    pub const ALL: [Endpoint; 7] = [
        Endpoint::CalculateNetwork,
        Endpoint::SummarizeIps,
        Endpoint::ConvertIp,
        Endpoint::FormatIp,
        Endpoint::DivideSubnet,
        Endpoint::QueryIpLocation,
        Endpoint::QueryDns,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CalculateNetwork => "/network/calculate",
            Endpoint::SummarizeIps => "/ip/summary",
            Endpoint::ConvertIp => "/ip/convert",
            Endpoint::FormatIp => "/ip/format",
            Endpoint::DivideSubnet => "/network/divide",
            Endpoint::QueryIpLocation => "/ip/location",
            Endpoint::QueryDns => "/dns/query",
        }
    }

    pub fn method(self) -> HttpMethod {
        HttpMethod::Post
    }

    /// Look up an endpoint by its relative path.
    pub fn from_path(path: &str) -> Option<Endpoint> {
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }
}
