// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the relay server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "tafl-relay", about = "Matchmaking and move-relay server for two-player tafl games")]
pub struct ServerConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "TAFL_RELAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "TAFL_RELAY_PORT")]
    pub port: u16,
}
