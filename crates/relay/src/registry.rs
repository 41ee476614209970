// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry: the pairing state machine.
//!
//! One `RwLock` guards the whole session map. Every mutating operation
//! holds the write guard across its full lookup/mutate/notify sequence
//! (participant notifications are non-blocking channel pushes), which is
//! what serializes a join racing an attacker disconnect, or two joins
//! racing each other, into exactly one winner. Lobby broadcasts are the
//! caller's job and must happen strictly after the operation returns.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::{ClientHandle, ClientId};
use crate::error::RelayError;
use crate::protocol::{LobbySession, ServerMessage, SessionState};
use crate::state::epoch_ms;

/// A live pairing between two connections.
///
/// `attacker` is bound at creation and never reassigned; `defender` is
/// bound exactly once by the first successful join. Teardown removes the
/// whole session from the registry — ids are uuid v4 and never reused.
pub struct GameSession {
    pub id: String,
    pub name: String,
    pub created_at_ms: u64,
    pub state: SessionState,
    pub attacker: ClientHandle,
    pub defender: Option<ClientHandle>,
}

impl GameSession {
    /// The participant on the other side of `requester`, if any.
    fn peer_of(&self, requester: ClientId) -> Option<&ClientHandle> {
        if self.attacker.id() == requester {
            self.defender.as_ref()
        } else {
            Some(&self.attacker)
        }
    }

    fn is_participant(&self, id: ClientId) -> bool {
        self.attacker.id() == id || self.defender.as_ref().is_some_and(|d| d.id() == id)
    }
}

/// Summary row for the HTTP inspection endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub session_id: String,
    pub session_name: String,
    pub game_state: SessionState,
    pub has_attacker: bool,
    pub has_defender: bool,
    pub created_at: u64,
}

/// Registry of all live sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, GameSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()) }
    }

    /// Create a session with `requester` as attacker and ack it.
    ///
    /// Never fails. An empty or missing name falls back to a placeholder
    /// derived from the id. Returns the new id; the caller triggers the
    /// lobby broadcast.
    pub async fn create(&self, requester: &ClientHandle, name: Option<String>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => format!("Game {}", &id[..8]),
        };

        let session = GameSession {
            id: id.clone(),
            name: name.clone(),
            created_at_ms: epoch_ms(),
            state: SessionState::Waiting,
            attacker: requester.clone(),
            defender: None,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), session);
        requester.send(ServerMessage::GameSession {
            session_id: id.clone(),
            session_name: name,
        });
        drop(sessions);

        info!(session_id = %id, client = %requester.id(), "session created");
        id
    }

    /// Bind `requester` as defender of a waiting session.
    ///
    /// On success both participants get the identical `gameState: playing`
    /// notification and the caller triggers a lobby broadcast. A join
    /// against a full session is rejected, never queued. A creator joining
    /// their own session is allowed.
    pub async fn join(&self, requester: &ClientHandle, session_id: &str) -> Result<(), RelayError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).ok_or(RelayError::SessionNotFound)?;
        if session.defender.is_some() {
            return Err(RelayError::SessionFull);
        }

        session.defender = Some(requester.clone());
        session.state = SessionState::Playing;

        let started = ServerMessage::GameState {
            game_state: SessionState::Playing,
            session_id: session.id.clone(),
        };
        session.attacker.send(started.clone());
        requester.send(started);
        drop(sessions);

        info!(session_id, client = %requester.id(), "player joined session");
        Ok(())
    }

    /// Forward an opaque move payload to the other participant.
    ///
    /// Delivery is fire-and-forget: a closed peer means the move is
    /// dropped, not an error back to the sender.
    pub async fn relay_move(
        &self,
        requester: &ClientHandle,
        session_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), RelayError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id).ok_or(RelayError::SessionNotFound)?;
        if !session.is_participant(requester.id()) {
            return Err(RelayError::NotAParticipant);
        }

        match session.peer_of(requester.id()) {
            Some(peer) if peer.is_open() => {
                peer.send(ServerMessage::Move {
                    session_id: session.id.clone(),
                    payload,
                });
            }
            _ => {
                debug!(session_id, client = %requester.id(), "peer closed, move dropped");
            }
        }
        Ok(())
    }

    /// Tear down every session `conn` participates in.
    ///
    /// The surviving peer of each, if still open, gets one
    /// `opponentDisconnected`. Returns the removed ids so the caller can
    /// fire a single lobby broadcast for the whole batch.
    pub async fn remove_sessions_of(&self, conn: ClientId) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let affected: Vec<String> = sessions
            .values()
            .filter(|s| s.is_participant(conn))
            .map(|s| s.id.clone())
            .collect();

        for id in &affected {
            if let Some(session) = sessions.remove(id) {
                if let Some(peer) = session.peer_of(conn) {
                    if peer.id() != conn && peer.is_open() {
                        peer.send(ServerMessage::OpponentDisconnected {
                            session_id: session.id.clone(),
                        });
                    }
                }
                info!(session_id = %id, "session removed after disconnect");
            }
        }
        affected
    }

    /// Fresh lobby view: every waiting session, in creation order. Always
    /// derived from the live map — there is no cached copy to drift.
    pub async fn waiting_snapshot(&self) -> Vec<LobbySession> {
        let sessions = self.sessions.read().await;
        let mut view: Vec<LobbySession> = sessions
            .values()
            .filter(|s| s.state == SessionState::Waiting)
            .map(|s| LobbySession {
                session_id: s.id.clone(),
                session_name: s.name.clone(),
                created_at: s.created_at_ms,
            })
            .collect();
        view.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.session_id.cmp(&b.session_id))
        });
        view
    }

    /// Full session list for the inspection endpoint.
    pub async fn overview(&self) -> Vec<SessionOverview> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<SessionOverview> = sessions
            .values()
            .map(|s| SessionOverview {
                session_id: s.id.clone(),
                session_name: s.name.clone(),
                game_state: s.state,
                has_attacker: true,
                has_defender: s.defender.is_some(),
                created_at: s.created_at_ms,
            })
            .collect();
        list.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.session_id.cmp(&b.session_id))
        });
        list
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
