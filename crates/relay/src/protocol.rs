// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for the relay.
//!
//! One JSON object per WebSocket text frame, tagged by a mandatory `type`
//! field. Field names are camelCase on the wire. Move payloads are opaque
//! JSON values — the relay forwards them verbatim and never interprets
//! their contents, so clients can evolve their move encoding without a
//! protocol change here.

use serde::{Deserialize, Serialize};

/// Messages accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a new session and wait for an opponent.
    CreateSession {
        #[serde(default)]
        session_name: Option<String>,
    },
    /// Join an existing waiting session as the second participant.
    JoinSession { session_id: String },
    /// Relay an opaque move payload to the other participant.
    Move {
        session_id: String,
        #[serde(rename = "move")]
        payload: serde_json::Value,
    },
    /// Opt into the lobby feed.
    SubscribeLobby,
    /// Opt out of the lobby feed.
    UnsubscribeLobby,
}

/// Messages pushed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Ack to the creator of a session, carrying the allocated id.
    GameSession { session_id: String, session_name: String },
    /// Sent to both participants when the second one joins.
    GameState { game_state: SessionState, session_id: String },
    /// A move forwarded from the other participant.
    Move {
        session_id: String,
        #[serde(rename = "move")]
        payload: serde_json::Value,
    },
    /// Full snapshot of sessions currently awaiting an opponent.
    LobbyUpdate { sessions: Vec<LobbySession> },
    /// The other participant's connection dropped; the session is gone.
    OpponentDisconnected { session_id: String },
    /// Rejection of a create/join/move request.
    Error { message: String },
}

/// Pairing state of a session. Termination is not a state — a torn-down
/// session is removed from the registry outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Waiting,
    Playing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
        }
    }
}

/// One row of the lobby view. `created_at` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySession {
    pub session_id: String,
    pub session_name: String,
    pub created_at: u64,
}
