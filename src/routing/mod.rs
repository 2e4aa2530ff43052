//! Route registry and request classification
//!
//! Every page the application serves has exactly one entry in the static
//! registry, which is the single source of truth for access control. The
//! classifier normalizes the incoming path and resolves it against the
//! registry, first by exact match and then by the longest segment-aligned
//! prefix, so nested routes inherit the access type of their parent.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Prefix that routes a request through the API pipeline
pub const API_PREFIX: &str = "/api/";

/// Well-known application paths
pub mod paths {
    /// Public landing page, also the redirect target for signed-out visitors
    pub const LANDING: &str = "/";
    /// Authenticated home feed, the redirect target after sign-in
    pub const HOME: &str = "/home";
    /// Public reels feed, browsable with or without a session
    pub const REELS: &str = "/reels";
    /// Reel upload page
    pub const REELS_UPLOAD: &str = "/reels/upload";
}

/// Who may reach a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Reachable only while signed out
    Public,
    /// Reachable only while signed in
    Protected,
    /// Reachable by everyone
    Universal,
}

/// Registry entry describing one route
#[derive(Debug, Clone)]
pub struct RouteData {
    pub name: &'static str,
    pub path: &'static str,
    pub access_type: AccessType,
}

static REGISTRY: Lazy<Vec<RouteData>> = Lazy::new(|| {
    vec![
        RouteData {
            name: "Landing Page",
            path: paths::LANDING,
            access_type: AccessType::Public,
        },
        RouteData {
            name: "Home Page",
            path: paths::HOME,
            access_type: AccessType::Protected,
        },
        RouteData {
            name: "Reels Feed",
            path: paths::REELS,
            access_type: AccessType::Universal,
        },
        RouteData {
            name: "Reels Upload Page",
            path: paths::REELS_UPLOAD,
            access_type: AccessType::Protected,
        },
    ]
});

/// The application's route registry, built once at first use
pub fn registry() -> &'static [RouteData] {
    &REGISTRY
}

/// Classification result for an incoming request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteClass {
    /// Whether the path belongs to the JSON API surface
    pub is_api: bool,
    /// Access type from the registry, `None` when no entry matches
    pub access_type: Option<AccessType>,
}

/// Classify a request path for pipeline selection and access control
pub fn classify(path: &str) -> RouteClass {
    RouteClass {
        is_api: path.starts_with(API_PREFIX),
        access_type: route_data(path).map(|route| route.access_type),
    }
}

/// Resolve the registry entry for a path, if any
///
/// Query and fragment suffixes are stripped and the path is normalized
/// before lookup. A missing entry means "no access restriction", which
/// callers must treat as such rather than as an error.
pub fn route_data(path: &str) -> Option<&'static RouteData> {
    route_data_in(path, registry())
}

fn route_data_in<'a>(path: &str, entries: &'a [RouteData]) -> Option<&'a RouteData> {
    let without_query = path
        .split('?')
        .next()
        .and_then(|p| p.split('#').next())
        .unwrap_or(path);
    let normalized = normalize_path(without_query);

    if let Some(exact) = entries.iter().find(|route| route.path == normalized) {
        return Some(exact);
    }

    // Longest path first, so nested routes resolve to their closest parent
    let mut candidates: Vec<&RouteData> = entries.iter().collect();
    candidates.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
    candidates.into_iter().find(|route| {
        normalized.starts_with(route.path)
            && (route.path == "/" || normalized.as_bytes().get(route.path.len()) == Some(&b'/'))
    })
}

/// True when the path resolves to a public route
pub fn is_public_route(path: &str) -> bool {
    route_data(path).map(|route| route.access_type) == Some(AccessType::Public)
}

/// True when the path resolves to a protected route
pub fn is_protected_route(path: &str) -> bool {
    route_data(path).map(|route| route.access_type) == Some(AccessType::Protected)
}

/// True when the path resolves to a universal route
pub fn is_universal_route(path: &str) -> bool {
    route_data(path).map(|route| route.access_type) == Some(AccessType::Universal)
}

/// Normalize a URL path
///
/// Collapses repeated separators, resolves `.` and `..` segments without
/// climbing above the root, and strips the trailing separator except for
/// the root path itself. An empty input normalizes to `/`.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}
