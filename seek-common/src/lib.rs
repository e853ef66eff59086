//! Types and utilities shared across the seek crates.
//!
//! Kept deliberately small so the HTTP, web and config crates can all depend
//! on it without pulling in each other.
//!
//! # Overview
//!
//! - [`Credentials`]: the subscription token handed to a search client
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use seek_common::Credentials;
//!
//! let creds = Credentials::new("  'abc123'\n");
//! assert_eq!(creds.token(), "abc123");
//! assert_eq!(format!("{creds:?}"), "Credentials(<redacted>)");
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod observability;

/// Subscription token authenticating every request to the search service.
///
/// Owned by a client for its whole lifetime and never mutated afterwards.
/// `Debug` output never contains the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wrap a raw token, stripping surrounding whitespace and quotes that
    /// commonly sneak in from shell exports and YAML files.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let token = raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim()
            .to_string();
        Self { token }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

impl From<String> for Credentials {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Credentials> for String {
    fn from(creds: Credentials) -> Self {
        creds.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_whitespace() {
        assert_eq!(Credentials::new("\"tok\"").token(), "tok");
        assert_eq!(Credentials::new(" tok \n").token(), "tok");
        assert_eq!(Credentials::new("' tok '").token(), "tok");
    }

    #[test]
    fn empty_token_is_detectable() {
        assert!(Credentials::new("  ").is_empty());
        assert!(!Credentials::new("x").is_empty());
    }

    #[test]
    fn deserializes_from_plain_string() {
        let creds: Credentials = serde_json::from_str("\" secret \"").unwrap();
        assert_eq!(creds.token(), "secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
