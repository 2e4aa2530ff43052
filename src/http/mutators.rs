//! Pure response mutators
//!
//! Helpers the middleware units use to extend a response on its way back
//! out. Each takes the optional pipeline value, leaves `None` untouched,
//! and returns a new response carrying the requested additions; status,
//! body, and unrelated headers of the input are preserved.

use axum::http::{header, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use tracing::error;

use super::response::AppResponse;

/// `SameSite` cookie attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Optional cookie attributes
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

/// One cookie to attach to a response
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl Cookie {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options: CookieOptions::default(),
        }
    }

    pub fn with_path<P: Into<String>>(mut self, path: P) -> Self {
        self.options.path = Some(path.into());
        self
    }

    /// Serialize into a `Set-Cookie` header line
    ///
    /// The value is URL-encoded; attribute order follows the common
    /// `Path, Domain, Max-Age, Expires, HttpOnly, Secure, SameSite` form.
    pub fn to_header_value(&self) -> String {
        let mut line = format!("{}={}", self.name, urlencoding::encode(&self.value));
        if let Some(path) = &self.options.path {
            line.push_str(&format!("; Path={path}"));
        }
        if let Some(domain) = &self.options.domain {
            line.push_str(&format!("; Domain={domain}"));
        }
        if let Some(max_age) = self.options.max_age {
            line.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(expires) = self.options.expires {
            line.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.options.http_only {
            line.push_str("; HttpOnly");
        }
        if self.options.secure {
            line.push_str("; Secure");
        }
        if let Some(same_site) = self.options.same_site {
            line.push_str(&format!("; SameSite={}", same_site.as_str()));
        }
        line
    }
}

/// Return a response extended with the given headers
///
/// Same-named headers on the result are overwritten; everything else is
/// carried over untouched. `None` passes through unchanged.
pub fn with_headers(
    response: Option<AppResponse>,
    headers: &[(&str, String)],
) -> Option<AppResponse> {
    let mut response = response?;
    for (name, value) in headers {
        if let Err(err) = response.add_header(name, value) {
            error!(header = name, error = %err, "skipping invalid response header");
        }
    }
    Some(response)
}

/// Return a response with one `Set-Cookie` line appended per cookie
///
/// `None` passes through unchanged.
pub fn with_cookies(response: Option<AppResponse>, cookies: &[Cookie]) -> Option<AppResponse> {
    let mut response = response?;
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => response.append_header(header::SET_COOKIE, value),
            Err(err) => {
                error!(cookie = %cookie.name, error = %err, "skipping invalid cookie");
            }
        }
    }
    Some(response)
}

/// Build an error response with a JSON content type
///
/// The message is logged server-side; the response carries only the
/// message itself plus the requested headers.
pub fn error_response(
    message: &str,
    status: StatusCode,
    headers: &[(&str, String)],
) -> AppResponse {
    error!(%status, message, "middleware error response");
    let mut response = AppResponse::with_status(status).text(message);
    if let Err(err) = response.add_header(header::CONTENT_TYPE.as_str(), "application/json") {
        error!(error = %err, "failed to tag error response content type");
    }
    with_headers(Some(response), headers).unwrap_or_else(|| AppResponse::with_status(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn none_passes_through_unchanged() {
        assert!(with_headers(None, &[("x-test", "1".to_string())]).is_none());
        assert!(with_cookies(None, &[Cookie::new("a", "b")]).is_none());
    }

    #[test]
    fn headers_are_added_and_overwritten_without_touching_the_rest() {
        let original = AppResponse::with_status(StatusCode::CREATED)
            .text("made")
            .header("x-keep", "yes")
            .unwrap()
            .header("x-replace", "old")
            .unwrap();
        let kept_status = original.status_code();

        let updated = with_headers(
            Some(original),
            &[
                ("x-replace", "new".to_string()),
                ("x-added", "1".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(updated.status_code(), kept_status);
        assert_eq!(updated.header_str("x-keep"), Some("yes"));
        assert_eq!(updated.header_str("x-replace"), Some("new"));
        assert_eq!(updated.header_str("x-added"), Some("1"));
        assert!(matches!(
            updated.body(),
            crate::http::ResponseBody::Text(text) if text == "made"
        ));
    }

    #[test]
    fn cookies_append_one_line_each() {
        let response = with_cookies(
            Some(AppResponse::ok()),
            &[
                Cookie::new("locale", "de").with_path("/"),
                Cookie::new("seen", "1"),
            ],
        )
        .unwrap();

        let lines = response.header_all("set-cookie");
        assert_eq!(lines, vec!["locale=de; Path=/", "seen=1"]);
    }

    #[test]
    fn cookie_values_are_url_encoded() {
        let cookie = Cookie::new("name", "a value/with chars");
        assert_eq!(cookie.to_header_value(), "name=a%20value%2Fwith%20chars");
    }

    #[test]
    fn cookie_attributes_serialize_in_order() {
        let expires = Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap();
        let cookie = Cookie {
            name: "session".to_string(),
            value: "tok".to_string(),
            options: CookieOptions {
                path: Some("/".to_string()),
                domain: Some("example.com".to_string()),
                max_age: Some(3600),
                expires: Some(expires),
                http_only: true,
                secure: true,
                same_site: Some(SameSite::Lax),
            },
        };
        assert_eq!(
            cookie.to_header_value(),
            "session=tok; Path=/; Domain=example.com; Max-Age=3600; \
             Expires=Thu, 15 Jan 2026 08:30:00 GMT; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn error_response_is_tagged_json() {
        let response = error_response(
            "Rate limit exceeded",
            StatusCode::TOO_MANY_REQUESTS,
            &[("Retry-After", "30".to_string())],
        );
        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.header_str("content-type"), Some("application/json"));
        assert_eq!(response.header_str("retry-after"), Some("30"));
    }
}
