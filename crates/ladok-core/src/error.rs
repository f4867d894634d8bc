//! The domain error shared by every part of the client

use thiserror::Error;

/// Result type for link model operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Error raised for every domain failure: missing arguments, relations or
/// URIs without a service segment, links that cannot be found, methods that
/// cannot be negotiated or dispatched, and non-success HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable description
    pub message: String,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
}

impl ApiError {
    /// Create an error without a status
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Create an error for a failed HTTP response
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Error for a required argument that was empty
    pub fn missing_argument(name: &str) -> Self {
        Self::new(format!("argument {} is required", name))
    }

    /// Error for a method that cannot be negotiated or followed
    pub fn unsupported_method(method: impl std::fmt::Display) -> Self {
        Self::new(format!("unsupported method {}", method))
    }
}
