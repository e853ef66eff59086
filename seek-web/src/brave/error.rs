use reqwest::StatusCode;
use seek_http::HttpError;
use thiserror::Error;

/// The query text broke one of the service's input bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("query is {len} characters long, the limit is {max}")]
    QueryTooLong { len: usize, max: usize },
    #[error("query has {count} words, the limit is {max}")]
    TooManyTokens { count: usize, max: usize },
}

/// A 2xx body that does not have the expected web-search shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response does not match schema at `{path}`: {message}")]
pub struct SchemaError {
    /// Dotted path of the offending value, `$` for the document root.
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(path: &str) -> Self {
        Self::new(path, "missing required field")
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Bad input; raised before any request is sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every attempt failed at the network level.
    #[error("search transport failed after {attempts} attempt(s): {message}")]
    Transport { attempts: usize, message: String },

    /// Every attempt got a non-2xx answer; carries the last one.
    #[error("search API returned {status} after {attempts} attempt(s): {message}")]
    HttpStatus {
        status: StatusCode,
        message: String,
        body: String,
        request_id: Option<String>,
        attempts: usize,
    },

    /// The service answered 2xx with a body we cannot read.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The client could not be constructed (bad base URL or token).
    #[error("search client setup failed: {0}")]
    Client(String),
}

impl SearchError {
    /// The caller has to change its input before trying again.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }

    /// The service may answer differently later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Transport { .. } | SearchError::HttpStatus { .. }
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SearchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for SearchError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Build(message) => SearchError::Client(message),
            HttpError::Network { attempts, message } => {
                SearchError::Transport { attempts, message }
            }
            HttpError::Status {
                status,
                message,
                body,
                request_id,
                attempts,
            } => SearchError::HttpStatus {
                status,
                message,
                body,
                request_id,
                attempts,
            },
        }
    }
}
