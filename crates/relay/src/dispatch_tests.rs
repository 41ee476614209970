// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::ClientHandle;
use crate::config::ServerConfig;
use crate::protocol::ServerMessage;
use crate::state::AppState;

fn test_state() -> AppState {
    let config = ServerConfig { host: "127.0.0.1".to_owned(), port: 0 };
    AppState::new(config, CancellationToken::new())
}

fn recv(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> anyhow::Result<ServerMessage> {
    rx.try_recv().map_err(|_| anyhow::anyhow!("expected a queued message"))
}

fn recv_lobby(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> anyhow::Result<usize> {
    match recv(rx)? {
        ServerMessage::LobbyUpdate { sessions } => Ok(sessions.len()),
        other => anyhow::bail!("expected lobbyUpdate, got {other:?}"),
    }
}

async fn create_session(
    state: &AppState,
    client: &ClientHandle,
    rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
    name: &str,
) -> anyhow::Result<String> {
    let frame = serde_json::json!({"type": "createSession", "sessionName": name}).to_string();
    super::dispatch(state, client, &frame).await;
    match recv(rx)? {
        ServerMessage::GameSession { session_id, session_name } => {
            assert_eq!(session_name, name);
            Ok(session_id)
        }
        other => anyhow::bail!("expected gameSession ack, got {other:?}"),
    }
}

// ── routing ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_is_dropped_without_reply() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();

    super::dispatch(&state, &a, "this is not json").await;

    assert!(a_rx.try_recv().is_err());
    assert_eq!(state.registry.session_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_type_is_dropped_without_reply() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();

    super::dispatch(&state, &a, r#"{"type": "castSpell", "target": "king"}"#).await;
    super::dispatch(&state, &a, r#"{"payload": "no type at all"}"#).await;

    assert!(a_rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn join_error_goes_to_requester_only() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (b, mut b_rx) = ClientHandle::channel();

    let id = create_session(&state, &a, &mut a_rx, "Game1").await?;

    let frame = serde_json::json!({"type": "joinSession", "sessionId": "bogus"}).to_string();
    super::dispatch(&state, &b, &frame).await;

    match recv(&mut b_rx)? {
        ServerMessage::Error { message } => assert_eq!(message, "Game session not found"),
        other => anyhow::bail!("expected error, got {other:?}"),
    }
    assert!(a_rx.try_recv().is_err());

    // Second join against a now-full session: same pattern.
    let frame = serde_json::json!({"type": "joinSession", "sessionId": id}).to_string();
    super::dispatch(&state, &b, &frame).await;
    let _ = recv(&mut a_rx)?; // gameState notice
    let _ = recv(&mut b_rx)?; // gameState notice

    let (c, mut c_rx) = ClientHandle::channel();
    super::dispatch(&state, &c, &frame).await;
    match recv(&mut c_rx)? {
        ServerMessage::Error { message } => assert_eq!(message, "Game session is full"),
        other => anyhow::bail!("expected error, got {other:?}"),
    }
    assert!(a_rx.try_recv().is_err());
    assert!(b_rx.try_recv().is_err());
    Ok(())
}

// ── lobby feed ────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_gets_immediate_snapshot() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    create_session(&state, &a, &mut a_rx, "Game1").await?;

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;

    assert_eq!(recv_lobby(&mut s_rx)?, 1);
    Ok(())
}

#[tokio::test]
async fn create_and_join_drive_lobby_updates() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (b, mut b_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(recv_lobby(&mut s_rx)?, 0);

    let id = create_session(&state, &a, &mut a_rx, "Game1").await?;
    assert_eq!(recv_lobby(&mut s_rx)?, 1);

    let frame = serde_json::json!({"type": "joinSession", "sessionId": id}).to_string();
    super::dispatch(&state, &b, &frame).await;
    let _ = recv(&mut b_rx)?; // gameState notice

    // The session left the waiting view.
    assert_eq!(recv_lobby(&mut s_rx)?, 0);
    Ok(())
}

#[tokio::test]
async fn unsubscribe_stops_updates() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(recv_lobby(&mut s_rx)?, 0);
    super::dispatch(&state, &s, r#"{"type": "unsubscribeLobby"}"#).await;
    // Unsubscribing twice is harmless.
    super::dispatch(&state, &s, r#"{"type": "unsubscribeLobby"}"#).await;

    create_session(&state, &a, &mut a_rx, "Game1").await?;

    assert!(s_rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn move_error_produces_no_broadcast() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    create_session(&state, &a, &mut a_rx, "Game1").await?;
    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(recv_lobby(&mut s_rx)?, 1);

    let frame =
        serde_json::json!({"type": "move", "sessionId": "bogus", "move": {"from": 1}}).to_string();
    super::dispatch(&state, &a, &frame).await;

    match recv(&mut a_rx)? {
        ServerMessage::Error { message } => assert_eq!(message, "Game session not found"),
        other => anyhow::bail!("expected error, got {other:?}"),
    }
    assert!(s_rx.try_recv().is_err());
    Ok(())
}

// ── disconnect cascade ────────────────────────────────────────────────────

#[tokio::test]
async fn disconnect_tears_down_and_broadcasts_once() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(recv_lobby(&mut s_rx)?, 0);

    // Two waiting sessions from the same connection.
    create_session(&state, &a, &mut a_rx, "Game1").await?;
    assert_eq!(recv_lobby(&mut s_rx)?, 1);
    create_session(&state, &a, &mut a_rx, "Game2").await?;
    assert_eq!(recv_lobby(&mut s_rx)?, 2);

    drop(a_rx);
    super::handle_disconnect(&state, &a).await;

    // One broadcast for the whole batch, not one per removed session.
    assert_eq!(recv_lobby(&mut s_rx)?, 0);
    assert!(s_rx.try_recv().is_err());
    assert_eq!(state.registry.session_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn disconnect_of_subscriber_removes_subscription() -> anyhow::Result<()> {
    let state = test_state();
    let (s, s_rx) = ClientHandle::channel();

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(state.lobby.subscriber_count().await, 1);

    drop(s_rx);
    super::handle_disconnect(&state, &s).await;

    assert_eq!(state.lobby.subscriber_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn disconnect_without_sessions_broadcasts_nothing() -> anyhow::Result<()> {
    let state = test_state();
    let (a, a_rx) = ClientHandle::channel();
    let (s, mut s_rx) = ClientHandle::channel();

    super::dispatch(&state, &s, r#"{"type": "subscribeLobby"}"#).await;
    assert_eq!(recv_lobby(&mut s_rx)?, 0);

    drop(a_rx);
    super::handle_disconnect(&state, &a).await;

    assert!(s_rx.try_recv().is_err());
    Ok(())
}

// ── end-to-end scenario ───────────────────────────────────────────────────

#[tokio::test]
async fn full_relay_scenario() -> anyhow::Result<()> {
    let state = test_state();
    let (a, mut a_rx) = ClientHandle::channel();
    let (b, mut b_rx) = ClientHandle::channel();

    // A creates, B joins with the returned id, both get the playing notice.
    let id = create_session(&state, &a, &mut a_rx, "Game1").await?;
    let frame = serde_json::json!({"type": "joinSession", "sessionId": id}).to_string();
    super::dispatch(&state, &b, &frame).await;
    assert!(matches!(recv(&mut a_rx)?, ServerMessage::GameState { .. }));
    assert!(matches!(recv(&mut b_rx)?, ServerMessage::GameState { .. }));

    // A sends a move; B receives it verbatim.
    let frame =
        serde_json::json!({"type": "move", "sessionId": id, "move": {"from": 3, "to": 7}})
            .to_string();
    super::dispatch(&state, &a, &frame).await;
    match recv(&mut b_rx)? {
        ServerMessage::Move { session_id, payload } => {
            assert_eq!(session_id, id);
            assert_eq!(payload, serde_json::json!({"from": 3, "to": 7}));
        }
        other => anyhow::bail!("expected forwarded move, got {other:?}"),
    }

    // B drops; A is told, and the session id is dead thereafter.
    drop(b_rx);
    super::handle_disconnect(&state, &b).await;
    match recv(&mut a_rx)? {
        ServerMessage::OpponentDisconnected { session_id } => assert_eq!(session_id, id),
        other => anyhow::bail!("expected opponentDisconnected, got {other:?}"),
    }

    let (c, mut c_rx) = ClientHandle::channel();
    let frame = serde_json::json!({"type": "joinSession", "sessionId": id}).to_string();
    super::dispatch(&state, &c, &frame).await;
    match recv(&mut c_rx)? {
        ServerMessage::Error { message } => assert_eq!(message, "Game session not found"),
        other => anyhow::bail!("expected error, got {other:?}"),
    }
    Ok(())
}
