// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! WebSocket transport for the relay.

use super::dispatch;
use super::hub::ClientId;
use super::protocol::ClientMessage;
use crate::app::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

/// `GET /ws`: upgrade and serve one relay client.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| serve_client(socket, state))
}

async fn serve_client(mut socket: WebSocket, state: AppState) {
    let client = Uuid::new_v4();
    let mut outbound = state.hub.subscribe(client);
    log::info!("Client connected: {}", client);

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => handle_frame(&state, client, &text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("Socket error from {}: {}", client, e);
                    break;
                }
            },
            Some(event) = outbound.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        log::error!("Failed to encode {} for {}: {}", event.name(), client, e);
                        continue;
                    }
                };
                if socket.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    state.hub.unsubscribe(client);
    log::info!("Client disconnected: {}", client);
}

/// Decode and dispatch one text frame. Failures are logged and swallowed
/// so a bad frame never takes the connection down.
pub async fn handle_frame(state: &AppState, client: ClientId, text: &str) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("Ignoring malformed frame from {}: {}", client, e);
            return;
        }
    };
    if let Err(e) = dispatch(state, client, message).await {
        log::warn!("Failed to handle frame from {}: {:#}", client, e);
    }
}
