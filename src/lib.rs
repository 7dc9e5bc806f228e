//! Nowcast relays the currently-playing state of a music account to any
//! number of passively connected viewers.
//!
//! A poll task asks the upstream player API for the current track, a
//! reconciler decides whether the canonical snapshot actually changed, and a
//! hub fans accepted snapshots out to every open viewer stream.

pub mod api;
pub mod auth;
pub mod playback;
pub mod relay;
pub mod settings;
pub mod spotify;
