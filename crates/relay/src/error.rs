// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use crate::protocol::ServerMessage;

/// Rejections reported back to the requesting client.
///
/// These never affect other connections and never tear a session down; the
/// requester gets a single `error` message and the request is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    SessionNotFound,
    SessionFull,
    NotAParticipant,
}

impl RelayError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionFull => "SESSION_FULL",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "Game session not found",
            Self::SessionFull => "Game session is full",
            Self::NotAParticipant => "You are not part of this game session",
        }
    }

    /// Convert into the wire-level `error` message.
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error { message: self.message().to_owned() }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for RelayError {}
