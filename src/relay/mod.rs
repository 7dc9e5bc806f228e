//! Viewer fan-out.
//!
//! The [`Hub`] keeps the set of live viewer streams in a registry keyed by
//! an opaque id and pushes every accepted snapshot to all of them. Delivery
//! is best-effort and at-most-once per publish per subscriber; a slow or
//! gone peer is dropped from the registry instead of holding up the rest.

mod handler;
mod hub;
mod types;

pub use handler::stream_handler;
pub use hub::{Hub, SubscriberId, Subscription};
pub use types::{StreamFrame, ViewerMessage};
