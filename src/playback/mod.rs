//! Canonical playback state and the poll/diff/notify loop.
//!
//! One [`PlaybackState`] per process, replaced wholesale on each accepted
//! transition. The [`Reconciler`] polls the upstream, suppresses redundant
//! updates by stability key, smooths single flaky polls into a degraded
//! update, and publishes accepted snapshots to the hub.

mod reconciler;
mod state;

pub use reconciler::{ReconcileOutcome, Reconciler, reconcile};
pub use state::{ArtistDisplay, PlaybackState, PlaybackStatus};
