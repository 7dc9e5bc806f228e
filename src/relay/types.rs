//! Wire frames for the viewer stream.

use serde::{Deserialize, Serialize};

use crate::playback::PlaybackState;

/// Frames sent to viewers over the stream connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Canonical snapshot; sent once on subscribe and then on every
    /// accepted or degraded change.
    State(PlaybackState),

    /// Keepalive no-op.
    Ping,
}

/// Messages viewers may send back. Anything that does not parse is logged
/// and ignored; the connection stays open.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerMessage {
    /// Heartbeat answer to a ping frame.
    Pong,
}
