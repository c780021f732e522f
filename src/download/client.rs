//! HTTP client wrapper for page fetches, icon downloads and the default icon probe.
//!
//! This module provides the `HttpClient` struct which applies per-request
//! timeouts and maps every failure into a [`DownloadError`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, UnwindSafe, catch_unwind, set_hook, take_hook};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, Proxy};
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, PROBE_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// Raw payload and declared content type of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Response body.
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, empty when absent or not valid UTF-8.
    pub content_type: String,
}

/// HTTP client used for every request of a run.
///
/// Created once and reused so connections are pooled. GET requests
/// (page and icon bodies) use the request timeout; the HEAD probe of
/// `/favicon.ico` uses the shorter probe timeout. Redirects are followed.
///
/// # Example
///
/// ```no_run
/// use favicon_core::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let icon = client.fetch("https://example.com/favicon.ico").await?;
/// println!("{} bytes of {}", icon.bytes.len(), icon.content_type);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - GET timeout: 10 seconds
    /// - HEAD probe timeout: 5 seconds
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(REQUEST_TIMEOUT_SECS, PROBE_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit GET and probe timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(request_timeout_secs: u64, probe_timeout_secs: u64) -> Self {
        let client = build_client().expect("failed to build HTTP client with static configuration");
        Self {
            client,
            request_timeout: Duration::from_secs(request_timeout_secs),
            probe_timeout: Duration::from_secs(probe_timeout_secs),
        }
    }

    /// Fetches `url` and returns its body and content type.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns a non-success status
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, DownloadError> {
        let response = self.send(Method::GET, url, self.request_timeout).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?
            .to_vec();

        debug!(bytes = bytes.len(), content_type = %content_type, "fetched");
        Ok(FetchResult {
            bytes,
            content_type,
        })
    }

    /// Fetches `url` and decodes the body as text (used for HTML pages).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch`](Self::fetch).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.send(Method::GET, url, self.request_timeout).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }

    /// Sends a HEAD request to `url` with the probe timeout.
    ///
    /// Returns `Ok(true)` when the final response (after redirects) has a
    /// success status and `Ok(false)` for any other status.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` for invalid URLs, transport failures and timeouts.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn probe(&self, url: &str) -> Result<bool, DownloadError> {
        match self.send(Method::HEAD, url, self.probe_timeout).await {
            Ok(_) => Ok(true),
            Err(DownloadError::HttpStatus { status, .. }) => {
                debug!(status, "probe returned non-success status");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .request(method, parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

/// Builds the shared client, retrying without system proxy lookup if that panics.
///
/// Some sandboxed macOS environments panic while reading system proxy settings.
fn build_client() -> Result<Client, reqwest::Error> {
    match try_build_client() {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback"
            );
            apply_env_proxy_fallback(base_client_builder().no_proxy()).build()
        }
    }
}

// `catch_unwind` still runs the panic hook; silence it while a guarded build runs.
static CLIENT_BUILD_PANIC_HOOK_LOCK: Mutex<()> = Mutex::new(());

fn try_build_client() -> Result<Result<Client, reqwest::Error>, Box<dyn Any + Send + 'static>> {
    catch_unwind_silent(AssertUnwindSafe(|| {
        #[cfg(test)]
        maybe_inject_client_build_panic();

        base_client_builder().build()
    }))
}

fn catch_unwind_silent<F, T>(operation: F) -> Result<T, Box<dyn Any + Send + 'static>>
where
    F: FnOnce() -> T + UnwindSafe,
{
    let _panic_hook_guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(operation);
    set_hook(previous_hook);
    outcome
}

fn base_client_builder() -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    for (scheme, names) in [
        ("https", ["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        ("http", ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
    ] {
        let Some(value) = first_env_value(&names) else {
            continue;
        };
        let proxy = if scheme == "https" {
            Proxy::https(&value)
        } else {
            Proxy::http(&value)
        };
        if let Ok(proxy) = proxy {
            builder = builder.proxy(proxy);
        }
    }
    builder
}

fn first_env_value(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
thread_local! {
    static CLIENT_BUILD_PANIC_INJECTIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[cfg(test)]
fn inject_client_build_panics(count: usize) {
    CLIENT_BUILD_PANIC_INJECTIONS.with(|injections| injections.set(count));
}

#[cfg(test)]
fn pending_client_build_panics() -> usize {
    CLIENT_BUILD_PANIC_INJECTIONS.with(std::cell::Cell::get)
}

#[cfg(test)]
fn maybe_inject_client_build_panic() {
    let remaining = pending_client_build_panics();
    if remaining > 0 {
        inject_client_build_panics(remaining - 1);
        panic!("injected HTTP client builder panic");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_bytes_and_content_type() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/icon.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/png")
                    .set_body_bytes(b"\x89PNG fake".to_vec()),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let result = client
            .fetch(&format!("{}/icon.png", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(result.bytes, b"\x89PNG fake");
        assert_eq!(result.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_fetch_missing_content_type_is_empty() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let result = client
            .fetch(&format!("{}/raw", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(result.content_type, "");
    }

    #[tokio::test]
    async fn test_fetch_404_is_http_status_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let result = client
            .fetch(&format!("{}/missing.png", mock_server.uri()))
            .await;

        match result {
            Err(DownloadError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_slow_response_times_out() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_timeouts(1, 1);
        let result = client.fetch(&format!("{}/slow", mock_server.uri())).await;
        assert!(
            matches!(result, Err(DownloadError::Timeout { .. })),
            "Expected Timeout, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let client = HttpClient::new();
        let result = client.fetch("not-a-valid-url").await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_text_returns_page_body() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=utf-8")
                    .set_body_string("<html><head></head></html>"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let body = client
            .fetch_text(&format!("{}/page", mock_server.uri()))
            .await
            .unwrap();
        assert!(body.contains("<head>"));
    }

    #[tokio::test]
    async fn test_probe_success_and_failure_statuses() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("HEAD"))
            .and(path("/favicon.ico"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/gone.ico"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        assert!(
            client
                .probe(&format!("{}/favicon.ico", mock_server.uri()))
                .await
                .unwrap()
        );
        assert!(
            !client
                .probe(&format!("{}/gone.ico", mock_server.uri()))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_probe_follows_redirects() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("HEAD"))
            .and(path("/favicon.ico"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/static/icon.ico", mock_server.uri())),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/static/icon.ico"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        assert!(
            client
                .probe(&format!("{}/favicon.ico", mock_server.uri()))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_requests_send_tool_user_agent() {
        use wiremock::{Match, Request};

        struct ToolUaMatcher;

        impl Match for ToolUaMatcher {
            fn matches(&self, request: &Request) -> bool {
                request
                    .headers
                    .get("User-Agent")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ua| {
                        ua.starts_with("favicon-dl/") && ua.contains(env!("CARGO_PKG_VERSION"))
                    })
            }
        }

        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(ToolUaMatcher)
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&mock_server)
            .await;

        let client = HttpClient::default();
        let result = client.fetch(&format!("{}/ua", mock_server.uri())).await;
        assert!(result.is_ok(), "Client must send User-Agent; got: {result:?}");
    }

    #[test]
    fn test_build_client_recovers_from_proxy_lookup_panic() {
        inject_client_build_panics(1);

        let client = build_client();

        assert!(client.is_ok());
        assert_eq!(pending_client_build_panics(), 0);
    }

    #[test]
    fn test_fallback_client_still_reports_invalid_url() {
        inject_client_build_panics(1);
        let client = HttpClient::new();
        assert_eq!(pending_client_build_panics(), 0);

        let result = tokio_test::block_on(client.fetch("not-a-valid-url"));
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_catch_unwind_silent_restores_hook_and_returns_value() {
        assert_eq!(catch_unwind_silent(|| 7).unwrap(), 7);
        assert!(catch_unwind_silent(|| -> u32 { panic!("boom") }).is_err());
    }

    #[test]
    fn test_first_env_value_returns_none_when_unset() {
        assert_eq!(first_env_value(&["FAVICON_DL_TEST_UNSET_PROXY"]), None);
    }
}
