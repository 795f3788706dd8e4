use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SubtitleError;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate may have installed one first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

pub fn default_client() -> Result<Client, SubtitleError> {
    install_rustls_provider();
    Ok(Client::builder().timeout(Duration::from_secs(30)).build()?)
}

/// Status and body of a finished GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SubtitleError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Headers and timeout scoped to a single request.
///
/// Platform identifiers travel with the call instead of living on the
/// session, so two requests never observe each other's headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    headers: HeaderMap,
    timeout: Duration,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout,
        }
    }

    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => match HeaderValue::from_str(value.as_ref()) {
                Ok(value) => {
                    self.headers.insert(name, value);
                }
                Err(e) => {
                    debug!(error = %e, "Invalid header value; skipping");
                }
            },
            Err(e) => {
                debug!(error = %e, "Invalid header name; skipping");
            }
        }
    }

    pub fn with_header<K: AsRef<str>, V: AsRef<str>>(mut self, key: K, value: V) -> Self {
        self.add_header_str(key, value);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The HTTP seam every pipeline component talks through.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, context: &RequestContext)
    -> Result<HttpResponse, SubtitleError>;
}

/// Authenticated platform session.
///
/// Carries default browser headers and the cookies loaded from the
/// credential store. Cookies are attached to every request.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    platform_headers: HeaderMap,
    cookies: FxHashMap<String, String>,
}

impl Session {
    pub fn new(client: Client) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            client,
            platform_headers: default_headers,
            cookies: FxHashMap::default(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn add_cookies(&mut self, cookies: FxHashMap<String, String>) {
        self.cookies.extend(cookies);
    }

    pub fn add_cookie<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.cookies.insert(name.into(), value.into());
    }

    /// `Cookie` header value, pairs sorted by name.
    fn cookie_header(&self) -> Option<HeaderValue> {
        if self.cookies.is_empty() {
            return None;
        }

        let mut pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        pairs.sort_unstable();

        HeaderValue::from_str(&pairs.join("; "))
            .inspect_err(|e| debug!(error = %e, "Failed to build Cookie header"))
            .ok()
    }

    /// Session defaults, then cookies, then the per-call headers on top.
    fn build_headers(&self, context: &RequestContext) -> HeaderMap {
        let mut headers = self.platform_headers.clone();

        if let Some(cookie) = self.cookie_header() {
            headers.insert(reqwest::header::COOKIE, cookie);
        }

        for (name, value) in context.headers() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

#[async_trait]
impl HttpClient for Session {
    async fn get(
        &self,
        url: &str,
        context: &RequestContext,
    ) -> Result<HttpResponse, SubtitleError> {
        let response = self
            .client
            .get(url)
            .headers(self.build_headers(context))
            .timeout(context.timeout())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%url, %status, "GET finished");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_headers_override_session_defaults() {
        let mut session = Session::new(default_client().unwrap());
        session.add_cookie("session__id", "abc");

        let context = RequestContext::default()
            .with_header("user-agent", "custom")
            .with_header("x-viki-app-ver", "1.0.0");
        let headers = session.build_headers(&context);

        assert_eq!(headers.get("user-agent").unwrap(), "custom");
        assert_eq!(headers.get("x-viki-app-ver").unwrap(), "1.0.0");
        assert_eq!(headers.get("cookie").unwrap(), "session__id=abc");
    }

    #[test]
    fn test_cookie_header_is_sorted() {
        let mut session = Session::new(default_client().unwrap());
        session.add_cookies(FxHashMap::from_iter([
            ("device_id".to_string(), "dev".to_string()),
            ("session__id".to_string(), "sess".to_string()),
        ]));
        session.add_cookie("_ga", "1");

        let headers = session.build_headers(&RequestContext::default());
        assert_eq!(
            headers.get("cookie").unwrap(),
            "_ga=1; device_id=dev; session__id=sess"
        );
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let context = RequestContext::default().with_header("bad header", "value");
        assert!(context.headers().is_empty());
    }

    #[test]
    fn test_no_cookie_header_without_cookies() {
        let session = Session::new(default_client().unwrap());
        let headers = session.build_headers(&RequestContext::default());
        assert!(headers.get("cookie").is_none());
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(StatusCode::OK, r#"{"video": {"id": "1"}}"#);
        assert!(response.is_ok());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["video"]["id"], "1");
    }
}
