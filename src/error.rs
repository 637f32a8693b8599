//! Error types for shelfdash.
//!
//! `ApiError` covers everything that can go wrong talking to the library
//! backend. `AggregateError` covers failures while deriving the dashboard
//! snapshot from already-fetched records.

use thiserror::Error;

/// Errors raised by a record source.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The base URL or an endpoint path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The backend did not answer within the configured timeout
    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// No connection could be established
    #[error("Cannot connect to library backend at {url}")]
    Connect { url: String },

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Non-2xx response from the backend
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Returns true when the backend rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }

    /// Returns true when the backend answered with an unexpected record shape.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}

/// Errors raised while deriving the dashboard snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// The configured main categories cannot be used as buckets
    #[error("Invalid category configuration: {0}")]
    InvalidCategories(String),

    /// A source answered with records of an unexpected shape
    #[error("Malformed {source_name} data: {reason}")]
    MalformedRecords {
        source_name: &'static str,
        reason: String,
    },
}
