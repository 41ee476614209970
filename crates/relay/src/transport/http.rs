// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only HTTP handlers for operational inspection.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_count: usize,
}

/// `GET /` — plain-text liveness line.
pub async fn root() -> &'static str {
    "tafl-relay game server is running"
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        session_count: s.registry.session_count().await,
    })
}

/// `GET /api/v1/sessions` — full session list with state and participant
/// presence, for debugging.
pub async fn list_sessions(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(s.registry.overview().await)
}
