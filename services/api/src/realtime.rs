//! Realtime notification channel
//!
//! Websocket endpoint backed by a broadcast channel. The transport is wired
//! into the router and accepts client connections, but no handler currently
//! publishes events to it.

use axum::{
    extract::State,
    extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// Capacity of the broadcast channel backing the websocket fan-out
const CHANNEL_CAPACITY: usize = 64;

/// Sender half of the realtime event channel
pub type EventSender = broadcast::Sender<String>;

/// Create the realtime event channel
pub fn channel() -> EventSender {
    broadcast::channel(CHANNEL_CAPACITY).0
}

/// Upgrade an incoming request to a websocket connection
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| client_connection(socket, events))
}

/// Pump broadcast events to a connected client until either side closes
async fn client_connection(socket: WebSocket, mut events: broadcast::Receiver<String>) {
    let client_id = Uuid::new_v4();
    info!("New realtime client connected: {}", client_id);

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(payload) => {
                        if sender.send(WsMessage::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        info!("Realtime client {} lagged, skipped {} events", client_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    // Inbound frames are not part of the protocol; drop them.
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("Realtime client disconnected: {}", client_id);
}
