//! `/ws`: live seat updates.
//!
//! Every client gets a `connected` greeting and then every update from the
//! broadcast loop. Anything the client sends is ignored apart from close.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::models::ServerMessage;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(live_updates))
}

pub async fn live_updates(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(sender: &mut futures::stream::SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match msg.to_json() {
        Ok(text) => sender.send(Message::Text(text.into())).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode live update: {}", e);
            true
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // subscribe before greeting so no update slips between the two
    let mut updates = state.updates.subscribe();
    info!("Client connected ({} total)", state.client_count());

    let (mut sender, mut receiver) = socket.split();
    let greeting = ServerMessage::Connected {
        message: "WebSocket connected".to_string(),
    };
    if !send(&mut sender, &greeting).await {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(msg) => {
                    if !send(&mut sender, &msg).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Slow client skipped {} updates", skipped),
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket error: {}", e);
                    break;
                }
            },
        }
    }
    drop(updates);
    info!("Client disconnected ({} remaining)", state.client_count());
}
