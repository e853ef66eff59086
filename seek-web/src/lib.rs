//! Web search over the Brave Search API.
//!
//! One call to [`BraveClient::search`] runs a fixed pipeline:
//! validate the parameters, build the request, send it with bounded retry,
//! then decode the body into a typed [`SearchResponse`]. Each stage fails
//! with its own [`SearchError`] variant so callers can tell bad input from
//! an unavailable service from a changed response contract.

pub mod brave;

pub use brave::client::{BraveClient, BraveClientBuilder};
pub use brave::error::{SchemaError, SearchError, ValidationError};
pub use brave::params::{SearchParams, SearchQuery};
pub use brave::request::RequestBuilder;
pub use brave::types::{SearchResponse, WebResult, parse_search_response};
