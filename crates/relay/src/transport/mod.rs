// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the relay.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router` with all relay routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness (plain text)
        .route("/", get(http::root))
        .route("/api/v1/health", get(http::health))
        // Operational inspection
        .route("/api/v1/sessions", get(http::list_sessions))
        // Game clients
        .route("/ws", get(ws::ws_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
