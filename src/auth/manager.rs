//! The credential manager.

use std::time::Duration;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::settings::Settings;

use super::credentials::{Credential, TokenResponse};
use super::error::{AuthError, AuthResult};

/// Scope requested from the upstream provider; the relay only ever reads
/// playback state.
const SCOPE: &str = "user-read-playback-state";

/// Owns the OAuth token pair and talks to the provider's token endpoint.
///
/// The credential is guarded by a single lock and mutated only by
/// [`exchange`](CredentialManager::exchange) and
/// [`refresh`](CredentialManager::refresh). Callers that need a token for
/// immediate use go through [`ensure_fresh`](CredentialManager::ensure_fresh).
pub struct CredentialManager {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    authorize_url: String,
    token_url: String,
    redirect_uri: String,
    credential: RwLock<Option<Credential>>,
}

impl CredentialManager {
    /// Create a manager from the server settings. No credential is stored
    /// until the authorization callback completes an exchange.
    pub fn new(settings: &Settings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            authorize_url: settings.authorize_url.clone(),
            token_url: settings.token_url.clone(),
            redirect_uri: settings.redirect_uri(),
            credential: RwLock::new(None),
        }
    }

    /// Whether a credential is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Provider authorize URL for the login redirect, carrying the
    /// anti-forgery `state` token.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(SCOPE),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// One-shot exchange of an authorization code for a token pair.
    pub async fn exchange(&self, code: &str) -> AuthResult<Credential> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;

        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            AuthError::Parse("exchange response carried no refresh_token".to_string())
        })?;

        let expires_at = response.expires_at();
        let credential = Credential {
            access_token: response.access_token,
            refresh_token,
            expires_at,
        };

        *self.credential.write().await = Some(credential.clone());
        info!("authorization code exchanged, credential stored");
        Ok(credential)
    }

    /// Return a token valid for immediate use, refreshing first when the
    /// stored one has expired or is about to.
    pub async fn ensure_fresh(&self) -> AuthResult<Credential> {
        {
            let guard = self.credential.read().await;
            match guard.as_ref() {
                None => return Err(AuthError::NotAuthenticated),
                Some(credential) if !credential.is_expired() => return Ok(credential.clone()),
                Some(_) => {}
            }
        }

        debug!("stored access token is stale, refreshing before use");
        self.refresh().await?;

        self.credential
            .read()
            .await
            .clone()
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Unconditionally exchange the refresh token for a new access token.
    ///
    /// On failure the stale credential stays in place; the next poll surfaces
    /// a degraded state instead of the process crashing.
    pub async fn refresh(&self) -> AuthResult<()> {
        let refresh_token = {
            let guard = self.credential.read().await;
            guard
                .as_ref()
                .map(|credential| credential.refresh_token.clone())
                .ok_or(AuthError::NotAuthenticated)?
        };

        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
            ])
            .await?;

        let mut guard = self.credential.write().await;
        let Some(credential) = guard.as_mut() else {
            return Err(AuthError::NotAuthenticated);
        };

        credential.expires_at = response.expires_at();
        credential.access_token = response.access_token;
        // the provider may rotate the refresh token; keep the old one otherwise
        if let Some(rotated) = response.refresh_token {
            credential.refresh_token = rotated;
        }

        info!(
            "access token refreshed, valid for {}s",
            credential.time_to_live().as_secs()
        );
        Ok(())
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> AuthResult<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::TokenEndpoint { status });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))
    }

    /// Store a credential directly, bypassing the token endpoint.
    #[cfg(test)]
    pub(crate) async fn seed(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }
}
