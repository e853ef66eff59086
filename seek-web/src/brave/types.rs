//! Typed Brave web-search response and its schema-checked decoder.
//!
//! Only the `web` section is modelled. Unknown fields are ignored, optional
//! ones default to `None`; `url` and `title` are required on every hit.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SchemaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Always "search"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryInfo>,

    pub web: WebResults,
}

impl SearchResponse {
    pub fn results(&self) -> &[WebResult] {
        &self.web.results
    }

    /// Hit URLs in the order the service ranked them.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.web.results.iter().map(|r| r.url.as_str())
    }
}

/// How the service understood the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub original: String,

    #[serde(default)]
    pub altered: Option<String>,
    #[serde(default)]
    pub spellcheck_off: Option<bool>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub is_navigational: Option<bool>,
    #[serde(default)]
    pub bad_results: Option<bool>,
    #[serde(default)]
    pub more_results_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResults {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub results: Vec<WebResult>,

    #[serde(default)]
    pub family_friendly: Option<bool>,
}

/// One web hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub url: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
    /// Only present when the request set `extra_snippets=true`.
    #[serde(default)]
    pub extra_snippets: Option<Vec<String>>,

    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub page_age: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub family_friendly: Option<bool>,
    #[serde(default)]
    pub meta_url: Option<MetaUrl>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaUrl {
    pub scheme: String,
    pub netloc: String,

    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub src: String,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

/// Top-level fields other than `web`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    query: Option<QueryInfo>,
}

/// `web` fields other than `results`.
#[derive(Deserialize)]
struct WebEnvelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    family_friendly: Option<bool>,
}

/// Decode a search response body.
///
/// Walks the document section by section so a mismatch is reported with the
/// path it occurred at, e.g. `web.results[1].meta_url.scheme`.
///
/// ```
/// use seek_web::parse_search_response;
///
/// let body = br#"{"web":{"results":[{"url":"https://a.example","title":"A"}]}}"#;
/// let resp = parse_search_response(body).unwrap();
/// assert_eq!(resp.urls().collect::<Vec<_>>(), vec!["https://a.example"]);
///
/// let err = parse_search_response(br#"{"news":{}}"#).unwrap_err();
/// assert_eq!(err.path, "web");
/// ```
pub fn parse_search_response(body: &[u8]) -> Result<SearchResponse, SchemaError> {
    let root: Value = serde_json::from_slice(body)
        .map_err(|e| SchemaError::new("$", format!("invalid JSON: {e}")))?;
    let mut root = into_object(root, "$")?;

    let web = root.remove("web").ok_or_else(|| SchemaError::missing("web"))?;
    let mut web = into_object(web, "web")?;

    let results = web
        .remove("results")
        .ok_or_else(|| SchemaError::missing("web.results"))?;
    let Value::Array(items) = results else {
        return Err(SchemaError::new("web.results", "expected an array"));
    };
    let results = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| decode(item, &format!("web.results[{i}]")))
        .collect::<Result<Vec<WebResult>, _>>()?;

    let web_meta: WebEnvelope = decode(Value::Object(web), "web")?;
    let envelope: Envelope = decode(Value::Object(root), "$")?;

    Ok(SearchResponse {
        kind: envelope.kind,
        query: envelope.query,
        web: WebResults {
            kind: web_meta.kind,
            results,
            family_friendly: web_meta.family_friendly,
        },
    })
}

fn into_object(v: Value, path: &str) -> Result<Map<String, Value>, SchemaError> {
    match v {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::new(
            path,
            format!("expected an object, found {}", json_type(&other)),
        )),
    }
}

/// Decode `v`, reporting failures at `prefix` joined with the field path
/// inside `v` (e.g. `web.results[0]` + `meta_url.scheme`).
fn decode<T: DeserializeOwned>(v: Value, prefix: &str) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize(v).map_err(|e| {
        let inner = e.path().to_string();
        let path = match (prefix, inner.as_str()) {
            (_, ".") => prefix.to_string(),
            ("$", inner) => inner.to_string(),
            (prefix, inner) if inner.starts_with('[') => format!("{prefix}{inner}"),
            (prefix, inner) => format!("{prefix}.{inner}"),
        };
        SchemaError::new(path, e.into_inner().to_string())
    })
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
