// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to one connected client.
//!
//! The transport layer owns the socket and the receiving half of the
//! outbound channel; everything else holds [`ClientHandle`] clones and must
//! tolerate the connection vanishing at any time. Sends are non-blocking
//! and best-effort: once the transport drops the receiver, `send` becomes a
//! silent no-op.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one connection, compared by value. Never reused for
/// the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Cloneable, non-owning sender side of a client's outbound queue.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    /// Allocate a fresh client identity plus the outbound channel pair.
    /// The caller (the WebSocket loop) keeps the receiver and pumps it to
    /// the socket.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id: ClientId::next(), tx }, rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Whether the transport is still draining this client's queue.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a message for delivery. Dropped silently if the connection is
    /// already closed.
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}
