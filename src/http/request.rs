//! Request abstraction for the middleware pipeline
//!
//! A read-only view of the parts of an incoming request the pipeline
//! cares about. The pipeline never mutates a request in place; units hand
//! the same value down the chain.

use axum::http::{HeaderMap, Method, Uri};
use std::collections::HashMap;

/// Immutable request view threaded through the middleware chain
#[derive(Debug, Clone)]
pub struct AppRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    cookies: HashMap<String, String>,
}

impl AppRequest {
    /// Create a request view from its components
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        let cookies = parse_cookies(&headers);
        Self {
            method,
            uri,
            headers,
            cookies,
        }
    }

    /// Convenience constructor for a GET request to a path
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri, HeaderMap::new())
    }

    /// Request path without query or fragment
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Header value as a string, `None` when absent or not valid UTF-8
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Cookie value by name
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Whether the request carries a cookie with the given name
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }
}

/// Parse all `Cookie` header lines into a name/value map
///
/// Later occurrences of a name win, matching how user agents send a
/// single combined header.
pub(crate) fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for header in headers.get_all(axum::http::header::COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    cookies
}
