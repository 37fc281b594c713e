//! Client Error Types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the data API, storage, and permission write path.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, TLS...).
    #[error("Connection failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// An operation that needs a signed-in user was called without one.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Attempted to persist a synthesized admin permission row.
    #[error("Synthesized admin permissions are read-only")]
    VirtualRecord,

    /// The requested row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object storage failure or a rejected upload.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed URL in configuration or a request path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Domain-level error from the shared types.
    #[error(transparent)]
    Common(#[from] od_common::Error),
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Common(od_common::Error::Validation(errors))
    }
}

impl ClientError {
    /// Whether the backend rejected the request for lack of rights.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. }
                if *status == StatusCode::FORBIDDEN || *status == StatusCode::UNAUTHORIZED
        )
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
