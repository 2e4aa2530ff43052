//! Response abstraction for the middleware pipeline
//!
//! `AppResponse` is a value type: units that want to change a response
//! build a new one (see `mutators`) rather than mutating what another
//! unit produced. The pass-through variant is the sentinel meaning
//! "no unit short-circuited, continue to the route handler".

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::errors::{AppError, AppResult};

/// Response body variants
#[derive(Debug, Clone, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Json(serde_json::Value),
}

/// Buildable HTTP response value
#[derive(Debug, Clone)]
pub struct AppResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    pass_through: bool,
}

impl AppResponse {
    /// Create an empty OK response
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Create an empty response with the given status
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
            pass_through: false,
        }
    }

    /// Create the pass-through sentinel
    ///
    /// Headers and cookies attached to it are merged onto whatever the
    /// terminal route handler eventually produces.
    pub fn next() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
            pass_through: true,
        }
    }

    /// Create a temporary redirect to the given location
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::with_status(StatusCode::TEMPORARY_REDIRECT);
        if let Ok(value) = HeaderValue::from_str(location) {
            response.headers.insert(header::LOCATION, value);
        }
        response
    }

    /// Set a text body (consuming)
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.body = ResponseBody::Text(text.into());
        self
    }

    /// Set a JSON body from a prebuilt value (consuming)
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = ResponseBody::Json(value);
        self
    }

    /// Set an HTML body with its content type (consuming)
    pub fn html<S: Into<String>>(self, markup: S) -> AppResult<Self> {
        self.text(markup)
            .header(header::CONTENT_TYPE.as_str(), "text/html; charset=utf-8")
    }

    /// Add a header (consuming)
    pub fn header<K, V>(mut self, key: K, value: V) -> AppResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.add_header(key, value)?;
        Ok(self)
    }

    /// Add a header (borrowing)
    pub fn add_header<K, V>(&mut self, key: K, value: V) -> AppResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::try_from(key.as_ref())
            .map_err(|e| AppError::internal(format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| AppError::internal(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a header line without replacing existing values
    pub(crate) fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Header value as a string, `None` when absent
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// All values for a header, in insertion order
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    /// Whether this is the pass-through sentinel
    pub fn is_pass_through(&self) -> bool {
        self.pass_through
    }

    /// Convert into the underlying framework response
    pub fn into_axum(self) -> Response {
        let default_content_type = match &self.body {
            ResponseBody::Empty => None,
            ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
            ResponseBody::Json(_) => Some("application/json"),
        };

        let body = match self.body {
            ResponseBody::Empty => Body::empty(),
            ResponseBody::Text(text) => Body::from(text),
            ResponseBody::Json(value) => Body::from(value.to_string()),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(content_type) = default_content_type {
            if !response.headers().contains_key(header::CONTENT_TYPE) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }
        response
    }
}

impl Default for AppResponse {
    fn default() -> Self {
        Self::ok()
    }
}
