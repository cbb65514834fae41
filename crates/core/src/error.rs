//! Errors surfaced by the search API and recorded in the session.

use thiserror::Error;

/// Fallback message shown when the server gives no usable explanation.
pub const GENERIC_SEARCH_ERROR: &str = "An error occurred while searching games";

/// Failure of a single API call. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request failed to complete or returned a non-success status.
    #[error("{message}")]
    NetworkOrServer {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Human-readable explanation.
        message: String,
    },
    /// The response body did not have the expected shape.
    #[error("Unexpected response from the search service: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    /// Transport-level failure without an HTTP status.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkOrServer {
            status: None,
            message: message.into(),
        }
    }

    /// Non-success HTTP status, optionally carrying the server's message.
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| GENERIC_SEARCH_ERROR.to_string());
        Self::NetworkOrServer {
            status: Some(status),
            message,
        }
    }

    /// Response could not be decoded into the expected collection.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse(detail.into())
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::network("The search service did not respond in time");
        }
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        match err.status() {
            Some(status) => Self::server(status.as_u16(), None),
            None => Self::network(format!("{GENERIC_SEARCH_ERROR}: {err}")),
        }
    }
}
