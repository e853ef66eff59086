//! Caller-facing search parameters and their validation.
//!
//! [`SearchParams`] is what a caller fills in; [`SearchParams::validate`]
//! turns it into a [`SearchQuery`] whose query text is known to be within
//! the service bounds and whose `count`/`offset` are clamped.

use super::error::ValidationError;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 400;
/// Most whitespace-separated words accepted in a query.
pub const MAX_QUERY_TOKENS: usize = 50;
/// Upper bound applied to `count`, whatever the caller asks for.
pub const MAX_COUNT: u32 = 3;
/// Upper bound applied to `offset`, whatever the caller asks for.
pub const MAX_OFFSET: u32 = 3;
/// Freshness filled in by [`SearchParams::new`]. The request builder always
/// sends `freshness=off` instead, so this value never reaches the wire.
pub const DEFAULT_FRESHNESS: &str = "pw";

/// Parameters for one web search.
///
/// `None` means "do not send this parameter". [`SearchParams::new`] fills in
/// the client defaults; override any field with struct update syntax.
///
/// ```
/// use seek_web::SearchParams;
///
/// let params = SearchParams {
///     search_lang: Some("en".into()),
///     extra_snippets: Some(true),
///     ..SearchParams::new("rust async runtime")
/// };
/// let query = params.validate().unwrap();
/// assert_eq!(query.params().count, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    /// ISO 639-1 language of the results.
    pub search_lang: Option<String>,
    /// Language of the response UI strings, e.g. `en-GB`.
    pub ui_lang: Option<String>,
    pub count: Option<u32>,
    pub offset: Option<u32>,
    /// `off`, `moderate` or `strict`.
    pub safesearch: Option<String>,
    /// `pd`, `pw`, `pm`, `py` or a `YYYY-MM-DDtoYYYY-MM-DD` range.
    pub freshness: Option<String>,
    pub text_decorations: Option<bool>,
    pub spellcheck: Option<bool>,
    /// Comma separated result types, e.g. `web,discussions`.
    pub result_filter: Option<String>,
    pub goggles_id: Option<String>,
    /// `metric` or `imperial`.
    pub units: Option<String>,
    pub extra_snippets: Option<bool>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            country: Some("GB".to_string()),
            search_lang: None,
            ui_lang: None,
            count: Some(MAX_COUNT),
            offset: Some(MAX_OFFSET),
            safesearch: Some("off".to_string()),
            freshness: Some(DEFAULT_FRESHNESS.to_string()),
            text_decorations: Some(true),
            spellcheck: Some(true),
            result_filter: None,
            goggles_id: None,
            units: None,
            extra_snippets: Some(false),
        }
    }

    /// Check the query bounds and clamp `count`/`offset`.
    ///
    /// Only the query text is checked; every other field is passed through.
    pub fn validate(mut self) -> Result<SearchQuery, ValidationError> {
        if self.query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        let len = self.query.chars().count();
        if len > MAX_QUERY_CHARS {
            return Err(ValidationError::QueryTooLong {
                len,
                max: MAX_QUERY_CHARS,
            });
        }
        let count = self.query.split_whitespace().count();
        if count > MAX_QUERY_TOKENS {
            return Err(ValidationError::TooManyTokens {
                count,
                max: MAX_QUERY_TOKENS,
            });
        }

        self.count = self.count.map(|c| c.min(MAX_COUNT));
        self.offset = self.offset.map(|o| o.min(MAX_OFFSET));
        Ok(SearchQuery { params: self })
    }
}

/// Parameters that passed [`SearchParams::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    params: SearchParams,
}

impl SearchQuery {
    pub fn text(&self) -> &str {
        &self.params.query
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn accepts_queries_within_bounds() {
        let longest = "x".repeat(MAX_QUERY_CHARS);
        let wordiest = words(MAX_QUERY_TOKENS);
        for q in ["a", " ", "rust", longest.as_str(), wordiest.as_str()] {
            assert!(SearchParams::new(q).validate().is_ok(), "{q:?}");
        }
    }

    #[test]
    fn rejects_empty_query() {
        assert_eq!(
            SearchParams::new("").validate(),
            Err(ValidationError::EmptyQuery)
        );
    }

    #[test]
    fn rejects_overlong_query() {
        let err = SearchParams::new("x".repeat(401)).validate().unwrap_err();
        assert_eq!(err, ValidationError::QueryTooLong { len: 401, max: 400 });
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let q = "é".repeat(MAX_QUERY_CHARS);
        assert!(q.len() > MAX_QUERY_CHARS);
        assert!(SearchParams::new(q).validate().is_ok());
    }

    #[test]
    fn rejects_too_many_tokens() {
        let err = SearchParams::new(words(51)).validate().unwrap_err();
        assert_eq!(err, ValidationError::TooManyTokens { count: 51, max: 50 });
    }

    #[test]
    fn tokens_split_on_any_whitespace() {
        let q = vec!["w"; 51].join("\t\n ");
        assert!(matches!(
            SearchParams::new(q).validate(),
            Err(ValidationError::TooManyTokens { count: 51, .. })
        ));
    }

    #[test]
    fn clamps_count_and_offset() {
        let query = SearchParams {
            count: Some(20),
            offset: Some(9),
            ..SearchParams::new("rust")
        }
        .validate()
        .unwrap();
        assert_eq!(query.params().count, Some(3));
        assert_eq!(query.params().offset, Some(3));
    }

    #[test]
    fn small_values_and_absent_values_are_kept() {
        let query = SearchParams {
            count: Some(1),
            offset: None,
            ..SearchParams::new("rust")
        }
        .validate()
        .unwrap();
        assert_eq!(query.params().count, Some(1));
        assert_eq!(query.params().offset, None);
    }

    #[test]
    fn other_fields_pass_through_untouched() {
        let params = SearchParams {
            units: Some("imperial".into()),
            goggles_id: Some("https://example.com/g".into()),
            ..SearchParams::new("rust")
        };
        let query = params.clone().validate().unwrap();
        assert_eq!(query.params().units, params.units);
        assert_eq!(query.params().goggles_id, params.goggles_id);
        assert_eq!(query.text(), "rust");
    }
}
