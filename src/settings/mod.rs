//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional `nowcast.toml`
//! file, then `NOWCAST_*` environment variables. Required values are
//! validated before any background task starts.

use std::path::Path;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Path the upstream provider redirects back to after authorization.
pub const CALLBACK_PATH: &str = "/api/callback";

/// Server configuration, sourced from file and environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,

    /// OAuth client id issued by the upstream provider.
    pub client_id: String,
    /// OAuth client secret issued by the upstream provider.
    pub client_secret: String,
    /// Authorize endpoint the login redirect points at.
    pub authorize_url: String,
    /// Token endpoint used for code exchange and refresh.
    pub token_url: String,
    /// Base URL of the player API.
    pub api_base_url: String,
    /// Externally reachable base URL of this relay, used to build the
    /// callback redirect URI.
    pub public_base_url: String,

    /// Seconds between playback polls.
    pub poll_interval_secs: u64,
    /// Seconds between scheduled credential refreshes.
    pub refresh_interval_secs: u64,
    /// Display name shown when nothing is playing.
    pub fallback_name: String,

    /// Origins allowed to call the relay cross-origin. Empty means any
    /// origin; the relay is a public read-only broadcast.
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base_url: "https://api.spotify.com".to_string(),
            public_base_url: String::new(),
            poll_interval_secs: 3,
            refresh_interval_secs: 1800,
            fallback_name: String::new(),
            cors_origins: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the given config file (or `nowcast.toml` in the
    /// working directory when none is given) plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("nowcast").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("NOWCAST")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("cors_origins"),
        );

        builder
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Validate required values. Called once at startup; a failure here is
    /// the only fatal error path in the process.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            bail!("client_id must be set (NOWCAST_CLIENT_ID)");
        }
        if self.client_secret.trim().is_empty() {
            bail!("client_secret must be set (NOWCAST_CLIENT_SECRET)");
        }
        if self.public_base_url.trim().is_empty() {
            bail!("public_base_url must be set (NOWCAST_PUBLIC_BASE_URL)");
        }
        if self.fallback_name.trim().is_empty() {
            bail!("fallback_name must be set (NOWCAST_FALLBACK_NAME)");
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }
        Ok(())
    }

    /// Redirect URI registered with the upstream provider.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}{}",
            self.public_base_url.trim_end_matches('/'),
            CALLBACK_PATH
        )
    }
}
