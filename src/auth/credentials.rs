//! OAuth credential types.

use std::time::{Duration, SystemTime};

use serde::Deserialize;

/// Margin before the actual expiry at which a token is already treated as
/// stale, so a poll never races the deadline.
pub(crate) const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// The access/refresh token pair for the relayed account.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, when the provider reported one.
    pub expires_at: Option<SystemTime>,
}

impl Credential {
    /// Whether the access token has expired or is about to.
    ///
    /// A credential without a known expiry is never considered expired; it
    /// stays in use until a scheduled refresh replaces it.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => SystemTime::now() + EXPIRY_LEEWAY >= expires_at,
            None => false,
        }
    }

    /// Remaining lifetime of the access token, zero when expired or unknown.
    #[must_use]
    pub fn time_to_live(&self) -> Duration {
        self.expires_at
            .and_then(|expires_at| expires_at.duration_since(SystemTime::now()).ok())
            .unwrap_or(Duration::ZERO)
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Present on code exchange; optional on refresh, in which case the
    /// previously stored refresh token is retained.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Absolute expiry derived from `expires_in`.
    pub(crate) fn expires_at(&self) -> Option<SystemTime> {
        self.expires_in
            .map(|secs| SystemTime::now() + Duration::from_secs(secs))
    }
}
