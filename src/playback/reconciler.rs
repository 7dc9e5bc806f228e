//! The poll, diff, notify loop.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};

use crate::auth::CredentialManager;
use crate::relay::Hub;
use crate::spotify::{ProviderPlayback, SpotifyClient};

use super::state::{PlaybackState, PlaybackStatus};

/// Decision for one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The candidate replaces the canonical state wholesale and is broadcast.
    Accepted(PlaybackState),
    /// The candidate matches the current stability key; nothing happens.
    Suppressed,
    /// A single failed poll after a healthy state: display fields are kept
    /// and only the status flips to error.
    Degraded(PlaybackState),
}

/// Decide what one candidate snapshot does to the canonical state.
///
/// A candidate whose `(status, track_name)` key equals the current one is
/// discarded. A failed poll right after a healthy non-placeholder state only
/// flips the status, preserving the last known display data; once two
/// consecutive cycles disagree, full replacement wins.
pub fn reconcile(
    current: &PlaybackState,
    candidate: PlaybackState,
    fallback_name: &str,
) -> ReconcileOutcome {
    if current.stability_key() == candidate.stability_key() {
        return ReconcileOutcome::Suppressed;
    }

    let current_is_healthy = !matches!(
        current.status,
        PlaybackStatus::Error | PlaybackStatus::Unknown
    ) && !current.is_placeholder(fallback_name);

    if candidate.status == PlaybackStatus::Error && current_is_healthy {
        let mut degraded = current.clone();
        degraded.status = PlaybackStatus::Error;
        return ReconcileOutcome::Degraded(degraded);
    }

    ReconcileOutcome::Accepted(candidate)
}

/// Polls the upstream on a fixed cadence and pushes accepted snapshots to
/// the hub.
///
/// At most one poll is in flight; a tick arriving while one is outstanding
/// is a no-op.
pub struct Reconciler {
    client: SpotifyClient,
    credentials: Arc<CredentialManager>,
    current: Arc<RwLock<PlaybackState>>,
    hub: Arc<Hub>,
    fallback_name: String,
    poll_guard: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        client: SpotifyClient,
        credentials: Arc<CredentialManager>,
        current: Arc<RwLock<PlaybackState>>,
        hub: Arc<Hub>,
        fallback_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            current,
            hub,
            fallback_name: fallback_name.into(),
            poll_guard: Mutex::new(()),
        }
    }

    /// Run one poll cycle. Skipped entirely when a previous cycle is still
    /// in flight.
    pub async fn tick(&self) {
        let Ok(_guard) = self.poll_guard.try_lock() else {
            debug!("previous poll still in flight, skipping tick");
            return;
        };

        let candidate = self.poll_once().await;
        self.apply(candidate).await;
    }

    /// Poll the upstream once and normalize the result, with the single
    /// permitted refresh-and-retry on a rejected token.
    async fn poll_once(&self) -> PlaybackState {
        let mut result = self.client.fetch_playback().await;

        if matches!(&result, Err(err) if err.is_unauthorized()) {
            warn!("access token rejected, refreshing and retrying once");
            match self.credentials.refresh().await {
                Ok(()) => result = self.client.fetch_playback().await,
                Err(refresh_err) => warn!("refresh after rejection failed: {refresh_err}"),
            }
        }

        match result {
            Ok(ProviderPlayback::Active(now)) => PlaybackState::playing(now, &self.fallback_name),
            Ok(ProviderPlayback::Inactive) => PlaybackState::idle(&self.fallback_name),
            Err(err) => {
                warn!("playback poll failed: {err}");
                PlaybackState::unavailable(&self.fallback_name)
            }
        }
    }

    /// Apply a candidate to the canonical state and notify subscribers when
    /// it was accepted.
    async fn apply(&self, candidate: PlaybackState) {
        let outcome = {
            let current = self.current.read().await;
            reconcile(&current, candidate, &self.fallback_name)
        };

        let next = match outcome {
            ReconcileOutcome::Suppressed => {
                debug!("poll result unchanged, suppressing broadcast");
                return;
            }
            ReconcileOutcome::Degraded(next) => {
                warn!(
                    "poll failed, keeping last known track with error status: {}",
                    next.track_name
                );
                next
            }
            ReconcileOutcome::Accepted(next) => {
                info!("playback update: {} ({})", next.track_name, next.status);
                next
            }
        };

        {
            let mut current = self.current.write().await;
            *current = next.clone();
        }
        self.hub.publish(next);
    }
}
