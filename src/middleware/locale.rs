//! Locale negotiation unit
//!
//! Resolves the visitor's language and refreshes the locale cookie on the
//! way out. Resolution order: a valid locale cookie, then the
//! `Accept-Language` header, then the configured fallback. The unit never
//! blocks or redirects.

use crate::config::I18nConfig;
use crate::http::{with_cookies, AppRequest, Cookie};
use crate::i18n;

use super::{Middleware, Next, NextFuture};

#[derive(Debug, Clone)]
pub struct LocaleMiddleware {
    config: I18nConfig,
}

impl LocaleMiddleware {
    pub fn new(config: I18nConfig) -> Self {
        Self { config }
    }

    /// Resolve the request's language
    ///
    /// The cookie value goes through the same negotiation as the header,
    /// so a hand-edited cookie cannot select an unsupported language.
    fn detect_language(&self, request: &AppRequest) -> String {
        if let Some(raw) = request.cookie(&self.config.cookie_name) {
            if let Some(language) = i18n::negotiate(raw, &self.config.languages) {
                return language;
            }
        }

        if let Some(header) = request.header_str("accept-language") {
            if let Some(language) = i18n::negotiate(header, &self.config.languages) {
                return language;
            }
        }

        self.config.fallback.clone()
    }
}

impl Middleware for LocaleMiddleware {
    fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static> {
        let unit = self.clone();
        Box::pin(async move {
            let language = unit.detect_language(&request);
            let response = next.run(request).await?;
            Ok(with_cookies(
                response,
                &[Cookie::new(unit.config.cookie_name.clone(), language).with_path("/")],
            ))
        })
    }

    fn name(&self) -> &'static str {
        "LocaleMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewarePipeline;
    use axum::http::{HeaderMap, HeaderValue, Method};

    fn pipeline() -> MiddlewarePipeline {
        MiddlewarePipeline::new().add(LocaleMiddleware::new(I18nConfig::default()))
    }

    fn request(cookie: Option<&str>, accept_language: Option<&str>) -> AppRequest {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(
                axum::http::header::COOKIE,
                HeaderValue::from_str(&format!("locale={cookie}")).unwrap(),
            );
        }
        if let Some(value) = accept_language {
            headers.insert("accept-language", HeaderValue::from_str(value).unwrap());
        }
        AppRequest::new(Method::GET, "/".parse().unwrap(), headers)
    }

    async fn locale_cookie(request: AppRequest) -> String {
        let response = pipeline().execute(request).await.unwrap().unwrap();
        response
            .header_all("set-cookie")
            .into_iter()
            .find(|line| line.starts_with("locale="))
            .expect("locale cookie present")
            .to_string()
    }

    #[tokio::test]
    async fn supported_cookie_wins() {
        let cookie = locale_cookie(request(Some("de"), None)).await;
        assert_eq!(cookie, "locale=de; Path=/");
    }

    #[tokio::test]
    async fn cookie_beats_header() {
        let cookie = locale_cookie(request(Some("de"), Some("es"))).await;
        assert_eq!(cookie, "locale=de; Path=/");
    }

    #[tokio::test]
    async fn header_is_negotiated_when_cookie_is_invalid() {
        let cookie = locale_cookie(request(Some("xx"), Some("es-419,en;q=0.5"))).await;
        assert_eq!(cookie, "locale=es; Path=/");
    }

    #[tokio::test]
    async fn fallback_applies_when_nothing_matches() {
        let cookie = locale_cookie(request(None, Some("ja,ko;q=0.8"))).await;
        assert_eq!(cookie, "locale=en; Path=/");
    }

    #[tokio::test]
    async fn handler_always_runs() {
        let response = pipeline()
            .execute_with(request(Some("de"), None), |_request| {
                Box::pin(async {
                    Ok(Some(crate::http::AppResponse::ok().text("page")))
                })
            })
            .await
            .unwrap()
            .unwrap();

        // Original body kept, cookie attached on the way out
        assert!(matches!(
            response.body(),
            crate::http::ResponseBody::Text(text) if text == "page"
        ));
        assert_eq!(
            response.header_all("set-cookie"),
            vec!["locale=de; Path=/"]
        );
    }
}
