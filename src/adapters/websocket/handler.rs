//! WebSocket upgrade handler for chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register the connection with its bounded outbound queue
//! 3. Drain the queue into the socket on a writer task
//! 4. Feed inbound frames to the router until close or error
//! 5. Unregister, announcing the departure to the connection's room

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::domain::foundation::{ConnectionId, RelayError};

use super::rooms::RoomRouter;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Router shared by every connection.
    pub router: Arc<RoomRouter>,
}

impl WebSocketState {
    pub fn new(router: Arc<RoomRouter>) -> Self {
        Self { router }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Routes: `GET /` and `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = ConnectionId::new();

    let (outbox, mut queue) = state.router.outbox();
    state.router.connect(connection_id, outbox).await;

    // Forward queued frames to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = queue.recv().await {
            if let Err(e) = sender.send(Message::Text(frame)).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
    });

    // Handle incoming frames from the client
    let router = state.router.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    router.handle_text(connection_id, &text).await;
                }
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => router.handle_text(connection_id, &text).await,
                    Err(_) => {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Received non UTF-8 binary frame"
                        );
                        router.reject(connection_id, RelayError::InvalidMessage).await;
                    }
                },
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level keepalive, answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Client sent close frame"
                    );
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Receive error: {}",
                        e
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.router.disconnect(connection_id).await;
}

/// Create axum router for the relay endpoint.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router().with_state(WebSocketState::new(router));
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_state_shares_router() {
        let router = Arc::new(RoomRouter::with_default_capacity());
        let state = WebSocketState::new(router.clone());

        assert!(Arc::ptr_eq(&state.router, &router));
    }

    #[test]
    fn websocket_router_creates_routes() {
        let _router = websocket_router();
    }
}
