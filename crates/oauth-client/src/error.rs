//! Error types for the oauth-client crate.

use thiserror::Error;

/// Errors that can occur while acquiring a client-credentials token.
///
/// None of these are retried: the first failure is returned to the caller.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// A credential field was empty at construction time
    #[error("Missing credential field: {field}")]
    MissingField { field: &'static str },

    /// The token endpoint is not an absolute URL
    #[error("Invalid token endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered with a non-2xx status
    #[error("Token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a token document
    #[error("Malformed token response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, OAuthError>;
