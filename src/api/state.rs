//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::auth::CredentialManager;
use crate::playback::PlaybackState;
use crate::relay::Hub;
use crate::settings::Settings;

/// Application state shared across all handlers.
///
/// The canonical playback snapshot and the credential each sit behind a
/// single lock; handlers only ever take snapshot copies.
#[derive(Clone)]
pub struct AppState {
    /// Validated server settings.
    pub settings: Arc<Settings>,
    /// OAuth credential manager.
    pub credentials: Arc<CredentialManager>,
    /// Canonical playback snapshot, updated only by the reconciler.
    pub playback: Arc<RwLock<PlaybackState>>,
    /// Subscriber registry for the viewer stream.
    pub hub: Arc<Hub>,
    /// Anti-forgery token of the login redirect currently awaiting its
    /// callback, if any.
    pub pending_login: Arc<Mutex<Option<String>>>,
}

impl AppState {
    /// Create new application state. The playback snapshot starts as the
    /// "connecting" placeholder until the first poll completes.
    pub fn new(settings: Settings) -> Self {
        let credentials = Arc::new(CredentialManager::new(&settings));
        let playback = Arc::new(RwLock::new(PlaybackState::connecting(
            &settings.fallback_name,
        )));

        Self {
            settings: Arc::new(settings),
            credentials,
            playback,
            hub: Arc::new(Hub::new()),
            pending_login: Arc::new(Mutex::new(None)),
        }
    }
}
