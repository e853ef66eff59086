//! HTTP transport with safe logging and a fixed-delay retry loop.
//!
//! - Requests are described up front as a [`RequestDescriptor`] (method, URL,
//!   headers, query pairs) and executed by [`HttpClient::execute`]
//! - Every failed attempt (network error or non-2xx status) is retried under
//!   the client's [`RetryPolicy`], sleeping through a pluggable [`Sleeper`]
//! - Credential headers and secret-looking query params are never logged
//! - Optional *raw* request/response logging via `SEEK_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), seek_http::HttpError> {
//! use seek_http::{HttpClient, RequestDescriptor, Url};
//!
//! let client = HttpClient::new()?;
//! let url = Url::parse("https://api.example.com/v1/items").unwrap();
//! let resp = client
//!     .execute(&RequestDescriptor::get(url).with_query("q", "rust"))
//!     .await?;
//! assert!(resp.status.is_success());
//! # Ok(()) }
//! ```
//!
//! Cancellation: dropping the future returned by [`HttpClient::execute`]
//! stops the loop wherever it is suspended; no further attempt is sent.

use std::borrow::Cow;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;

mod retry;

pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use url::Url;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SEEK_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    let (host_path, query) = redact_query(url);
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        parts.push(format!("'{}://{}'", url.scheme(), host_path));
    } else {
        parts.push(format!("'{}://{}?{}'", url.scheme(), host_path, query));
    }
    parts.join(" ")
}

fn is_secret_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "authorization" | "proxy-authorization" | "x-subscription-token" | "x-api-key"
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// "host + path" plus the redacted query list, for logging.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.to_string()
            };
            (k, v)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error after {attempts} attempt(s): {message}")]
    Network { attempts: usize, message: String },
    #[error("server returned error {status} after {attempts} attempt(s): {message}")]
    Status {
        status: StatusCode,
        message: String,
        /// Full response body of the last attempt.
        body: String,
        request_id: Option<String>,
        attempts: usize,
    },
}

impl HttpError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single attempt did not produce a 2xx response.
#[derive(Debug)]
enum AttemptFailure {
    Network(String),
    Status {
        status: StatusCode,
        body: Bytes,
        request_id: Option<String>,
    },
}

impl AttemptFailure {
    fn into_error(self, attempts: usize) -> HttpError {
        match self {
            AttemptFailure::Network(message) => HttpError::Network { attempts, message },
            AttemptFailure::Status {
                status,
                body,
                request_id,
            } => HttpError::Status {
                status,
                message: extract_error_message(&body),
                body: String::from_utf8_lossy(&body).into_owned(),
                request_id,
                attempts,
            },
        }
    }
}

// ==============================
// Request / response values
// ==============================

/// Everything needed to send one request, independent of any client.
///
/// ```
/// use seek_http::{RequestDescriptor, Url};
///
/// let url = Url::parse("https://api.example.com/search").unwrap();
/// let req = RequestDescriptor::get(url)
///     .with_query("q", "rust")
///     .with_query("count", "3");
///
/// assert_eq!(req.query_value("count"), Some("3"));
/// assert_eq!(req.query_value("offset"), None);
/// ```
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Query pairs in wire order; absent parameters are simply not listed.
    pub query: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn request_id(&self) -> Option<&str> {
        request_id_header(&self.headers)
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    pub default_timeout: Duration,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpClient {
    /// Construct a client with the default retry policy and tokio sleeper.
    ///
    /// ```no_run
    /// use seek_http::{HttpClient, HttpError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.retry_policy(), &RetryPolicy::default());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(15),
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Per-attempt timeout covering send and body read.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // ==============================
    // Core request implementation
    // ==============================

    /// Send `req`, retrying any failed attempt until the policy is spent.
    ///
    /// Returns the first 2xx response. On exhaustion the error carries the
    /// last attempt's status and body, or its network error.
    pub async fn execute(&self, req: &RequestDescriptor) -> Result<RawResponse, HttpError> {
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let failure = match self.attempt(req, &req_id, attempt).await? {
                Ok(resp) => return Ok(resp),
                Err(failure) => failure,
            };

            let Some(delay) = self.policy.delay_after(attempt) else {
                let err = failure.into_error(attempt);
                tracing::warn!(
                    req_id=%req_id,
                    attempt,
                    max_attempts,
                    error=%err,
                    "http.error"
                );
                return Err(err);
            };

            match &failure {
                AttemptFailure::Network(message) => tracing::warn!(
                    req_id=%req_id,
                    attempt,
                    max_attempts,
                    delay_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying.network"
                ),
                AttemptFailure::Status { status, body, .. } => tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_attempts,
                    delay_ms=delay.as_millis() as u64,
                    body_snippet=%snip_body(body),
                    "http.retrying"
                ),
            }
            self.sleeper.sleep(delay).await;
        }
    }

    /// One round trip. The outer `Result` is for failures that retrying
    /// cannot fix (the request itself could not be built).
    async fn attempt(
        &self,
        req: &RequestDescriptor,
        req_id: &str,
        attempt: usize,
    ) -> Result<Result<RawResponse, AttemptFailure>, HttpError> {
        let request = self
            .inner
            .request(req.method.clone(), req.url.clone())
            .headers(req.headers.clone())
            .query(&req.query)
            .timeout(self.default_timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        let (host_path, redacted_q) = redact_query(request.url());
        tracing::debug!(
            req_id=%req_id,
            attempt,
            max_attempts=self.policy.max_attempts,
            method=%request.method(),
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=self.default_timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(request.method(), request.url(), request.headers());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = match self.inner.execute(request).await {
            Ok(resp) => resp,
            Err(err) => return Ok(Err(AttemptFailure::Network(network_message(&err)))),
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Ok(Err(AttemptFailure::Network(network_message(&err)))),
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            x_request_id=%request_id_header(&headers).unwrap_or("-"),
            rate_limit.limit=?header_str(&headers, "x-ratelimit-limit"),
            rate_limit.remaining=?header_str(&headers, "x-ratelimit-remaining"),
            rate_limit.reset=?header_str(&headers, "x-ratelimit-reset"),
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = body.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?redact_headers(&headers),
                body=%text,
                truncated
            );
        }

        if status.is_success() {
            return Ok(Ok(RawResponse {
                status,
                headers,
                body,
            }));
        }

        Ok(Err(AttemptFailure::Status {
            status,
            request_id: request_id_header(&headers).map(str::to_string),
            body,
        }))
    }
}

// ==============================
// Helpers
// ==============================

/// Classify a transport failure and flatten its `source()` chain, since
/// reqwest's own `Display` stops at the outermost layer.
fn network_message(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else {
        "request"
    };
    let mut message = format!("{kind}: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn header_str<'a>(h: &'a HeaderMap, name: &str) -> Option<&'a str> {
    h.get(name).and_then(|v| v.to_str().ok())
}

fn request_id_header(h: &HeaderMap) -> Option<&str> {
    header_str(h, "x-request-id").or_else(|| header_str(h, "x-correlation-id"))
}

/// Pull a human-readable message out of an error body.
fn extract_error_message(body: &[u8]) -> String {
    // Brave: {"type":"ErrorResponse","error":{"code":"...","detail":"...","status":422}}
    #[derive(Deserialize)]
    struct BraveEnv {
        error: BraveDetail,
    }
    #[derive(Deserialize)]
    struct BraveDetail {
        #[serde(default)]
        detail: String,
        #[serde(default)]
        code: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<BraveEnv>(body) {
        match (env.error.code.is_empty(), env.error.detail.is_empty()) {
            (false, false) => return format!("{}: {}", env.error.code, env.error.detail),
            (true, false) => return env.error.detail,
            (false, true) => return env.error.code,
            (true, true) => {}
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for s in [m.message, m.detail, m.error] {
            if !s.is_empty() {
                return s;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credential_headers() {
        let mut h = HeaderMap::new();
        h.insert("x-subscription-token", HeaderValue::from_static("s3cr3t"));
        h.insert("accept", HeaderValue::from_static("application/json"));
        let redacted = redact_headers(&h);
        assert!(redacted.contains(&("x-subscription-token".into(), "<redacted>".into())));
        assert!(redacted.contains(&("accept".into(), "application/json".into())));
    }

    #[test]
    fn redacts_secret_query_params_only() {
        let url = Url::parse("https://api.example.com/web/search?q=rust&api_key=abc").unwrap();
        let (host_path, q) = redact_query(&url);
        assert_eq!(host_path, "api.example.com/web/search");
        assert_eq!(
            q,
            vec![
                ("q".to_string(), "rust".to_string()),
                ("api_key".to_string(), "<redacted>".to_string()),
            ]
        );
    }

    #[test]
    fn curl_line_never_contains_the_token() {
        let mut h = HeaderMap::new();
        h.insert("x-subscription-token", HeaderValue::from_static("s3cr3t"));
        let url = Url::parse("https://api.example.com/web/search?q=a+b").unwrap();
        let curl = make_curl(&Method::GET, &url, &h);
        assert!(!curl.contains("s3cr3t"));
        assert!(curl.starts_with("curl -XGET"));
        assert!(curl.ends_with("'https://api.example.com/web/search?q=a b'"));
    }

    #[test]
    fn extracts_brave_error_detail() {
        let body = br#"{"type":"ErrorResponse","error":{"id":"x","status":422,"code":"VALIDATION","detail":"Unable to validate request parameter(s)"}}"#;
        assert_eq!(
            extract_error_message(body),
            "VALIDATION: Unable to validate request parameter(s)"
        );
    }

    #[test]
    fn falls_back_to_generic_then_snippet() {
        assert_eq!(extract_error_message(br#"{"message":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn snippet_is_truncated_on_char_boundary() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);
    }

    #[test]
    fn descriptor_keeps_query_order() {
        let url = Url::parse("https://api.example.com/").unwrap();
        let req = RequestDescriptor::get(url)
            .with_query("q", "x")
            .with_query("count", "3");
        let keys: Vec<_> = req.query.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["q", "count"]);
        assert_eq!(req.method, Method::GET);
    }

    #[test]
    fn attempt_failure_keeps_status_and_body() {
        let failure = AttemptFailure::Status {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::from_static(b"upstream down"),
            request_id: Some("abc".into()),
        };
        match failure.into_error(3) {
            HttpError::Status {
                status,
                body,
                request_id,
                attempts,
                ..
            } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "upstream down");
                assert_eq!(request_id.as_deref(), Some("abc"));
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
