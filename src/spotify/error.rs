//! Player API error types.

use thiserror::Error;

use crate::auth::AuthError;

/// Result type for player API operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while polling the upstream player API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No usable access token was available for the call.
    #[error("no usable access token: {0}")]
    Auth(#[from] AuthError),

    /// The upstream rejected the access token; the caller may refresh and
    /// retry once within the same poll cycle.
    #[error("upstream rejected the access token")]
    Unauthorized,

    /// The upstream rate limit was hit; retried on the next scheduled poll.
    #[error("upstream rate limit hit")]
    RateLimited,

    /// The upstream answered with an unexpected status.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: reqwest::StatusCode },

    /// The request could not be sent or the connection broke.
    #[error("request to upstream failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream response could not be understood.
    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether a refresh-and-retry is worth attempting.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
