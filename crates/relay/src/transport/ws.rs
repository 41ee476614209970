// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection WebSocket loop for game clients.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::info;

use crate::client::ClientHandle;
use crate::dispatch;
use crate::state::AppState;

/// `GET /ws` — WebSocket upgrade for a game client.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Per-connection event loop.
///
/// The connection's outbound queue is drained here and nowhere else; core
/// state only ever holds [`ClientHandle`] clones. Whatever way the loop
/// exits, the receiver is dropped first (flipping every held handle to
/// closed) and the disconnect cascade runs exactly once.
async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let (client, mut rx) = ClientHandle::channel();
    info!(client = %client.id(), "client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,

            // Drain the outbound queue to the socket.
            out = rx.recv() => {
                match out {
                    Some(msg) => {
                        let Ok(json) = serde_json::to_string(&msg) else {
                            continue;
                        };
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Handle frames from the client.
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        dispatch::dispatch(&state, &client, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    info!(client = %client.id(), "client disconnected");
    // Close the queue before cleanup so the cascade never targets this
    // connection.
    drop(rx);
    dispatch::handle_disconnect(&state, &client).await;
}
