// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tafl-relay: matchmaking and move-relay server for two-player tafl games.
//!
//! The server pairs two WebSocket connections into a session and forwards
//! opaque move payloads between them. It validates nothing about the game
//! itself — no rules, no board state, no move legality. A live lobby feed
//! tracks sessions still waiting for an opponent.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lobby;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the relay server until shutdown.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let state = Arc::new(AppState::new(config, shutdown.clone()));
    let router = build_router(Arc::clone(&state));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("tafl-relay listening on {addr}");
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
