//! Static route table: URL path to view.
//!
//! Paths may be given with or without the hash-history `#` prefix. `/` is a
//! redirect, not a route.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    NetworkCalc,
    IpSummary,
    IpConversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/network-calc",
        name: "NetworkCalc",
        view: View::NetworkCalc,
    },
    Route {
        path: "/ip-summary",
        name: "IpSummary",
        view: View::IpSummary,
    },
    Route {
        path: "/ip-conversion",
        name: "IpConversion",
        view: View::IpConversion,
    },
];

/// `(from, to)` pairs.
pub const REDIRECTS: &[(&str, &str)] = &[("/", "/network-calc")];

/// Resolve `path` to its route, following redirects. Query strings and
/// trailing slashes are ignored.
pub fn resolve(path: &str) -> Option<&'static Route> {
    let path = normalize_path(path);
    let target = REDIRECTS
        .iter()
        .find(|(from, _)| *from == path)
        .map_or(path, |(_, to)| *to);
    ROUTES.iter().find(|route| route.path == target)
}

pub fn by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

fn normalize_path(path: &str) -> &str {
    let path = path.strip_prefix('#').unwrap_or(path);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
