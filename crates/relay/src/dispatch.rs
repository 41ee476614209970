// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound message router and disconnect cascade.
//!
//! Routing is fail-open: frames that don't decode, and decoded frames with
//! an unrecognized `type`, are logged and dropped without a reply. The
//! connection is never closed for sending garbage.

use tracing::debug;

use crate::client::ClientHandle;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// Route one inbound text frame.
pub async fn dispatch(state: &AppState, client: &ClientHandle, text: &str) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            debug!(client = %client.id(), err = %e, "dropping undecodable message");
            return;
        }
    };

    let msg: ClientMessage = match serde_json::from_value(value.clone()) {
        Ok(m) => m,
        Err(_) => {
            let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or("<missing>");
            debug!(client = %client.id(), kind, "dropping message of unknown type");
            return;
        }
    };

    match msg {
        ClientMessage::CreateSession { session_name } => {
            state.registry.create(client, session_name).await;
            broadcast_lobby(state).await;
        }
        ClientMessage::JoinSession { session_id } => {
            match state.registry.join(client, &session_id).await {
                // The session just left the waiting view.
                Ok(()) => broadcast_lobby(state).await,
                Err(e) => client.send(e.to_message()),
            }
        }
        ClientMessage::Move { session_id, payload } => {
            if let Err(e) = state.registry.relay_move(client, &session_id, payload).await {
                client.send(e.to_message());
            }
        }
        ClientMessage::SubscribeLobby => {
            state.lobby.subscribe(client.clone()).await;
            // New subscribers get the current view right away rather than
            // waiting for the next state change.
            client.send(ServerMessage::LobbyUpdate {
                sessions: state.registry.waiting_snapshot().await,
            });
        }
        ClientMessage::UnsubscribeLobby => {
            state.lobby.unsubscribe(client.id()).await;
        }
    }
}

/// Cleanup cascade for a closed connection.
///
/// Unsubscribe first so the dead connection is never a broadcast target,
/// then tear down its sessions, then fire at most one broadcast for the
/// whole batch.
pub async fn handle_disconnect(state: &AppState, client: &ClientHandle) {
    state.lobby.unsubscribe(client.id()).await;
    let removed = state.registry.remove_sessions_of(client.id()).await;
    if !removed.is_empty() {
        broadcast_lobby(state).await;
    }
}

/// Recompute the waiting view and push it to all subscribers. Must run
/// strictly after the triggering registry mutation has committed.
async fn broadcast_lobby(state: &AppState) {
    let view = state.registry.waiting_snapshot().await;
    state.lobby.broadcast(view).await;
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
