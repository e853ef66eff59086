//! Turns a validated [`SearchQuery`] into a concrete [`RequestDescriptor`].

use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use seek_common::Credentials;
use seek_http::RequestDescriptor;
use url::Url;

use super::error::SearchError;
use super::params::{DEFAULT_FRESHNESS, SearchQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1/";
pub const DEFAULT_ENDPOINT: &str = "web";

pub const SUBSCRIPTION_TOKEN_HEADER: &str = "x-subscription-token";

// Sent on every request no matter what the caller asked for.
pub const FORCED_COUNTRY: &str = "GB";
pub const FORCED_SAFESEARCH: &str = "off";
pub const FORCED_FRESHNESS: &str = "off";

/// Builds search requests for one endpoint and one subscription token.
#[derive(Clone)]
pub struct RequestBuilder {
    url: Url,
    token: HeaderValue,
}

impl RequestBuilder {
    /// `{base_url}{endpoint}/search`, e.g. `.../res/v1/web/search`.
    pub fn new(
        base_url: &str,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Self, SearchError> {
        let url = search_url(base_url, endpoint)?;
        if credentials.is_empty() {
            return Err(SearchError::Client("subscription token is empty".into()));
        }
        let mut token = HeaderValue::from_str(credentials.token()).map_err(|e| {
            SearchError::Client(format!("subscription token is not a valid header value: {e}"))
        })?;
        token.set_sensitive(true);
        Ok(Self { url, token })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Pure transformation; absent fields are left out of the query string.
    pub fn build(&self, query: &SearchQuery) -> RequestDescriptor {
        let p = query.params();
        log_override("country", p.country.as_deref(), None, FORCED_COUNTRY);
        log_override("safesearch", p.safesearch.as_deref(), None, FORCED_SAFESEARCH);
        log_override(
            "freshness",
            p.freshness.as_deref(),
            Some(DEFAULT_FRESHNESS),
            FORCED_FRESHNESS,
        );

        let mut req = RequestDescriptor::get(self.url.clone())
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_header(
                HeaderName::from_static(SUBSCRIPTION_TOKEN_HEADER),
                self.token.clone(),
            )
            .with_query("q", query.text())
            .with_query("country", FORCED_COUNTRY);

        let optional: [(&'static str, Option<String>); 12] = [
            ("search_lang", p.search_lang.clone()),
            ("ui_lang", p.ui_lang.clone()),
            ("count", p.count.map(|v| v.to_string())),
            ("offset", p.offset.map(|v| v.to_string())),
            ("safesearch", Some(FORCED_SAFESEARCH.to_string())),
            ("freshness", Some(FORCED_FRESHNESS.to_string())),
            ("text_decorations", p.text_decorations.map(bool_param)),
            ("spellcheck", p.spellcheck.map(bool_param)),
            ("result_filter", p.result_filter.clone()),
            ("goggles_id", p.goggles_id.clone()),
            ("units", p.units.clone()),
            ("extra_snippets", p.extra_snippets.map(bool_param)),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                req = req.with_query(name, value);
            }
        }
        req
    }
}

fn search_url(base_url: &str, endpoint: &str) -> Result<Url, SearchError> {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_matches('/');
    if endpoint.is_empty() {
        return Err(SearchError::Client("endpoint category is empty".into()));
    }
    let raw = format!("{base}/{endpoint}/search");
    Url::parse(&raw).map_err(|e| SearchError::Client(format!("invalid URL {raw}: {e}")))
}

fn bool_param(v: bool) -> String {
    v.to_string()
}

/// A caller value is overridden when it was set, differs from the forced
/// value, and is not just the constructor default.
fn is_caller_override(requested: Option<&str>, default: Option<&str>, forced: &str) -> bool {
    match requested {
        Some(requested) => requested != forced && Some(requested) != default,
        None => false,
    }
}

fn log_override(name: &str, requested: Option<&str>, default: Option<&str>, forced: &str) {
    if let Some(requested) = requested
        && is_caller_override(Some(requested), default, forced)
    {
        tracing::debug!(
            target: "web.brave",
            param = name,
            requested,
            forced,
            "brave.request.param_overridden"
        );
    }
}
