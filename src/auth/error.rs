//! Credential manager error types.

use thiserror::Error;

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while exchanging or refreshing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential has been stored yet; the login redirect has not been
    /// completed.
    #[error("not authenticated: no credential stored yet")]
    NotAuthenticated,

    /// The token endpoint rejected the request.
    #[error("token endpoint returned HTTP {status}")]
    TokenEndpoint { status: reqwest::StatusCode },

    /// The token request could not be sent.
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token response could not be understood.
    #[error("failed to parse token response: {0}")]
    Parse(String),
}
