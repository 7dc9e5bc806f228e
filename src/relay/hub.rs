//! Subscriber registry and fan-out.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::playback::PlaybackState;

use super::types::StreamFrame;

/// Size of the per-subscriber send buffer. A viewer that falls this far
/// behind is dropped rather than waited on.
const SUBSCRIBER_BUFFER_SIZE: usize = 16;

/// Opaque handle for one registered subscriber.
pub type SubscriberId = u64;

/// One registered subscriber: its id and the frame stream to drain.
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::Receiver<StreamFrame>,
}

/// Registry of live viewer streams.
///
/// `publish` iterates a snapshot of the registry, so concurrent
/// subscribe/unsubscribe calls never block on a broadcast in progress.
pub struct Hub {
    subscribers: DashMap<SubscriberId, mpsc::Sender<StreamFrame>>,
    next_id: AtomicU64,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber.
    ///
    /// The given snapshot is queued before registration, so the receiver
    /// always observes the current state first, with no prior history.
    pub fn subscribe(&self, snapshot: PlaybackState) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER_SIZE);
        // the buffer is fresh, this cannot fail
        let _ = tx.try_send(StreamFrame::State(snapshot));

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, tx);
        info!(
            "subscriber {id} registered ({} active)",
            self.subscriber_count()
        );

        Subscription { id, rx }
    }

    /// Remove a subscriber. Idempotent; safe to call concurrently with a
    /// publish.
    pub fn unsubscribe(&self, id: SubscriberId) {
        if self.subscribers.remove(&id).is_some() {
            info!(
                "subscriber {id} unregistered ({} active)",
                self.subscriber_count()
            );
        }
    }

    /// Push a snapshot to every registered subscriber.
    ///
    /// A subscriber whose channel is closed or full is removed; the
    /// broadcast continues for the others.
    pub fn publish(&self, state: PlaybackState) {
        let targets: Vec<(SubscriberId, mpsc::Sender<StreamFrame>)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (id, tx) in targets {
            match tx.try_send(StreamFrame::State(state.clone())) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("subscriber {id} is not keeping up, dropping it");
                    self.subscribers.remove(&id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("subscriber {id} is gone, dropping it");
                    self.subscribers.remove(&id);
                }
            }
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscriber, closing their streams. Used on process
    /// shutdown.
    pub fn shutdown(&self) {
        let dropped = self.subscriber_count();
        self.subscribers.clear();
        if dropped > 0 {
            info!("closed {dropped} subscriber streams");
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
