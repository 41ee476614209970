// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::lobby::Lobby;
use crate::registry::SessionRegistry;

/// Shared server state, passed as `Arc<AppState>` to every handler. The
/// registry and lobby are the only mutable structures; each guards itself.
pub struct AppState {
    pub registry: SessionRegistry,
    pub lobby: Lobby,
    pub config: ServerConfig,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ServerConfig, shutdown: CancellationToken) -> Self {
        Self {
            registry: SessionRegistry::new(),
            lobby: Lobby::new(),
            config,
            shutdown,
        }
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
