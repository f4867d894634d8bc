//! Error types for client operations

use ladok_core::ApiError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, LadokClientError>;

/// Errors that can occur during client operations
#[derive(Error, Debug)]
pub enum LadokClientError {
    /// Domain failure: bad argument, unknown relation, missing link,
    /// unsupported method or a non-success HTTP status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse or encode a JSON body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LadokClientError {
    /// The domain error, if this is one
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status,
            Self::HttpError(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LadokClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
