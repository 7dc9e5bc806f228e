//! WebSocket handler for viewer connections.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};

use crate::api::AppState;
use crate::playback::PlaybackState;

use super::hub::{Hub, Subscription};
use super::types::{StreamFrame, ViewerMessage};

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// WebSocket upgrade handler.
///
/// GET /api/stream
pub async fn stream_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    let snapshot = state.playback.read().await.clone();

    ws.on_upgrade(move |socket| handle_stream(socket, hub, snapshot))
}

/// Drive one viewer connection until either end closes it.
async fn handle_stream(socket: WebSocket, hub: Arc<Hub>, snapshot: PlaybackState) {
    let (mut sender, mut receiver) = socket.split();
    let Subscription { id, mut rx } = hub.subscribe(snapshot);

    // Push frames (starting with the queued snapshot) and periodic pings.
    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    // channel closed: the hub dropped us (shutdown or eviction)
                    let Some(frame) = frame else { break };
                    let json = match serde_json::to_string(&frame) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("failed to serialize frame for subscriber {id}: {e}");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }

                _ = ping_interval.tick() => {
                    let json = serde_json::to_string(&StreamFrame::Ping).unwrap();
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = sender.send(Message::Close(None)).await;
    });

    // Drain inbound messages; anything malformed is logged and ignored.
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ViewerMessage>(text.as_str()) {
                Ok(ViewerMessage::Pong) => debug!("subscriber {id} answered keepalive"),
                Err(e) => warn!("ignoring malformed message from subscriber {id}: {e}"),
            },
            Ok(Message::Binary(_)) => {
                debug!("ignoring binary message from subscriber {id}");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // transport-level keepalive, axum answers pings itself
            }
            Ok(Message::Close(_)) => {
                debug!("subscriber {id} closed the stream");
                break;
            }
            Err(e) => {
                warn!("stream error for subscriber {id}: {e}");
                break;
            }
        }
    }

    send_task.abort();
    hub.unsubscribe(id);
    info!("subscriber {id} disconnected");
}
