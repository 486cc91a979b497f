//! Error types for HTTP operations.

use thiserror::Error;

/// Network-level failure reaching the API.
///
/// Non-2xx responses are *not* errors at this layer; the status code is
/// reported alongside the body and the caller decides what it means.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection failed (DNS, refused, TLS, reset while reading the body).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not answer within the transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
