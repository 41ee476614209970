// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lobby broadcaster — fans the waiting-session view out to every
//! subscribed connection.
//!
//! Membership is the only state here; the view itself is recomputed by the
//! caller from the registry on every broadcast so it can never drift.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::client::{ClientHandle, ClientId};
use crate::protocol::{LobbySession, ServerMessage};

pub struct Lobby {
    subscribers: RwLock<HashMap<ClientId, ClientHandle>>,
}

impl Lobby {
    pub fn new() -> Self {
        Self { subscribers: RwLock::new(HashMap::new()) }
    }

    /// Add a connection to the subscription set. The caller follows up by
    /// pushing the current view to that connection alone.
    pub async fn subscribe(&self, handle: ClientHandle) {
        let id = handle.id();
        self.subscribers.write().await.insert(id, handle);
        debug!(client = %id, "lobby subscribed");
    }

    /// Remove a connection from the subscription set. Idempotent —
    /// unsubscribing a non-member is a no-op.
    pub async fn unsubscribe(&self, id: ClientId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            debug!(client = %id, "lobby unsubscribed");
        }
    }

    /// Push a lobby snapshot to every open subscriber. Handles found closed
    /// are pruned from the set during the sweep.
    pub async fn broadcast(&self, sessions: Vec<LobbySession>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|id, handle| {
            if !handle.is_open() {
                debug!(client = %id, "pruning closed lobby subscriber");
                return false;
            }
            handle.send(ServerMessage::LobbyUpdate { sessions: sessions.clone() });
            true
        });
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "lobby_tests.rs"]
mod tests;
