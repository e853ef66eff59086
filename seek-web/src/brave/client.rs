use std::sync::Arc;
use std::time::{Duration, Instant};

use seek_common::Credentials;
use seek_http::{HttpClient, RetryPolicy, Sleeper};

use super::error::SearchError;
use super::params::SearchParams;
use super::request::{DEFAULT_BASE_URL, DEFAULT_ENDPOINT, RequestBuilder};
use super::types::{SearchResponse, parse_search_response};

const QUERY_LOG_CHARS: usize = 160;

/// Client for one Brave Search endpoint (usually `web`).
///
/// Cheap to clone; clones share the connection pool. Concurrent searches
/// share nothing mutable.
///
/// ```no_run
/// use seek_common::Credentials;
/// use seek_web::{BraveClient, SearchParams};
///
/// # async fn demo() -> Result<(), seek_web::SearchError> {
/// let brave = BraveClient::new(Credentials::new("BSA..."), "web")?;
/// let resp = brave.search(SearchParams::new("question")).await?;
/// for url in resp.urls() {
///     println!("{url}");
/// }
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct BraveClient {
    http: HttpClient,
    requests: RequestBuilder,
    endpoint: String,
}

impl BraveClient {
    pub fn new(credentials: Credentials, endpoint: impl Into<String>) -> Result<Self, SearchError> {
        Self::builder(credentials).endpoint(endpoint).build()
    }

    pub fn builder(credentials: Credentials) -> BraveClientBuilder {
        BraveClientBuilder {
            credentials,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            retry_policy: RetryPolicy::default(),
            sleeper: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Validate `params`, send the request with retry, and decode the hits.
    ///
    /// Validation errors are returned before anything is sent. Schema errors
    /// are never retried.
    pub async fn search(&self, params: SearchParams) -> Result<SearchResponse, SearchError> {
        let query = match params.validate() {
            Ok(q) => q,
            Err(e) => {
                tracing::debug!(target: "web.brave", error = %e, "brave.search.invalid");
                return Err(e.into());
            }
        };
        let query_snippet = snippet(query.text());
        let req = self.requests.build(&query);

        let started = Instant::now();
        tracing::info!(
            target: "web.brave",
            query = %query_snippet,
            endpoint = %self.endpoint,
            "brave.search.start"
        );

        let raw = match self.http.execute(&req).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    target: "web.brave",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "brave.search.error"
                );
                return Err(e.into());
            }
        };

        let resp = match parse_search_response(&raw.body) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    target: "web.brave",
                    query = %query_snippet,
                    path = %e.path,
                    error = %e.message,
                    x_request_id = raw.request_id().unwrap_or("-"),
                    "brave.search.schema_error"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            target: "web.brave",
            query = %query_snippet,
            hit_count = resp.results().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "brave.search.success"
        );
        Ok(resp)
    }
}

/// Construction knobs for [`BraveClient`]. Everything except the
/// credentials has a default.
pub struct BraveClientBuilder {
    credentials: Credentials,
    endpoint: String,
    base_url: String,
    timeout: Option<Duration>,
    retry_policy: RetryPolicy,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl BraveClientBuilder {
    /// Search vertical, `web` unless told otherwise.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    pub fn build(self) -> Result<BraveClient, SearchError> {
        let requests = RequestBuilder::new(&self.base_url, &self.endpoint, &self.credentials)?;

        let mut http = HttpClient::new()?.with_retry_policy(self.retry_policy);
        if let Some(timeout) = self.timeout {
            http = http.with_timeout(timeout);
        }
        if let Some(sleeper) = self.sleeper {
            http = http.with_sleeper(sleeper);
        }

        tracing::debug!(
            target: "web.brave",
            url = %requests.url(),
            max_attempts = self.retry_policy.max_attempts,
            delay_ms = self.retry_policy.delay.as_millis() as u64,
            "brave.client.ready"
        );

        Ok(BraveClient {
            http,
            requests,
            endpoint: self.endpoint,
        })
    }
}

fn snippet(query: &str) -> String {
    if query.chars().count() > QUERY_LOG_CHARS {
        let mut s: String = query.chars().take(QUERY_LOG_CHARS).collect();
        s.push('…');
        s
    } else {
        query.to_string()
    }
}
