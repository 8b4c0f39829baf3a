//! WebSocket handler for presence and task relay.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use floorlink_core::identity;
use floorlink_core::presence::{ConnectionId, Identity};
use floorlink_core::protocol::ClientEvent;
use floorlink_core::FloorError;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::hub::{Outbound, PresenceHub};
use crate::state::AppState;

/// Close code for an expired token.
pub const CLOSE_TOKEN_EXPIRED: u16 = 4001;
/// Close code for a missing or invalid token.
pub const CLOSE_TOKEN_INVALID: u16 = 4002;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws[?token=JWT]
///
/// With a secret configured, the token decides who the connection is. A bad
/// token still upgrades, then closes straight away with 4001 or 4002.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let Some(secret) = state.jwt_secret.clone() else {
        return ws.on_upgrade(move |socket| handle_socket(socket, state, None));
    };

    let verified = match query.token.as_deref() {
        Some(token) => identity::verify_token(&secret, token),
        None => Err(FloorError::TokenInvalid("missing token".to_string())),
    };

    match verified {
        Ok(bound) => {
            info!(user_id = %bound.user_id, "WebSocket connection authenticated");
            ws.on_upgrade(move |socket| handle_socket(socket, state, Some(bound)))
        }
        Err(err) => {
            let (code, reason) = match err {
                FloorError::TokenExpired => (CLOSE_TOKEN_EXPIRED, "Token expired"),
                _ => (CLOSE_TOKEN_INVALID, "Token invalid"),
            };
            warn!(close_code = code, error = %err, "WebSocket auth failed");
            ws.on_upgrade(move |mut socket| async move {
                let frame = CloseFrame {
                    code,
                    reason: reason.into(),
                };
                let _ = socket.send(Message::Close(Some(frame))).await;
            })
        }
    }
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState, bound: Option<Identity>) {
    let connection_id = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();

    state.hub.connect(connection_id, tx);
    info!(connection_id = %connection_id, "WebSocket client connected");

    // Forward hub events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match event.encode() {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode server event");
                    continue;
                }
            };
            debug!(connection_id = %connection_id, event = event.name(), "Sending event");
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                return;
            }
        }
        // Queue closed by the hub
        let _ = sender.send(Message::Close(None)).await;
    });

    // Handle incoming messages from client
    let hub = state.hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    dispatch(&hub, connection_id, bound.as_ref(), text.as_str());
                }
                Message::Close(_) => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.disconnect(connection_id);
    info!(connection_id = %connection_id, "WebSocket client disconnected");
}

/// Apply one client frame to the hub.
///
/// A token-bound connection always registers as its token identity; the
/// announced fields are only compared and logged.
pub(crate) fn dispatch(
    hub: &PresenceHub,
    connection_id: ConnectionId,
    bound: Option<&Identity>,
    text: &str,
) {
    match ClientEvent::decode(text) {
        Ok(ClientEvent::Announce(announced)) => {
            let identity = match bound {
                Some(bound) => {
                    if *bound != announced {
                        debug!(
                            connection_id = %connection_id,
                            announced_user = %announced.user_id,
                            token_user = %bound.user_id,
                            "Announce differs from token identity, using token"
                        );
                    }
                    bound.clone()
                }
                None => announced,
            };
            hub.announce(connection_id, identity);
        }
        Ok(ClientEvent::TaskMutation(mutation)) => {
            hub.relay(connection_id, mutation);
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "Ignoring client frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorlink_core::presence::Role;
    use floorlink_core::protocol::ServerEvent;

    const ANNOUNCE: &str =
        r#"{"type":"announce","data":{"userId":"spoof","username":"boss","role":"admin"}}"#;

    #[test]
    fn test_dispatch_trusts_announce_without_token() {
        let hub = PresenceHub::new();
        let id = ConnectionId::new();
        dispatch(&hub, id, None, ANNOUNCE);

        let roster = hub.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, "spoof");
        assert_eq!(roster[0].role, Role::Admin);
    }

    #[test]
    fn test_dispatch_prefers_token_identity() {
        let hub = PresenceHub::new();
        let id = ConnectionId::new();
        let bound = Identity::new("u7", "franco", Role::Warehouse);
        dispatch(&hub, id, Some(&bound), ANNOUNCE);

        let roster = hub.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].identity(), bound);
    }

    #[test]
    fn test_dispatch_ignores_garbage() {
        let hub = PresenceHub::new();
        dispatch(&hub, ConnectionId::new(), None, "{not json");
        dispatch(&hub, ConnectionId::new(), None, r#"{"type":"hello","data":1}"#);
        assert!(hub.roster().is_empty());
    }

    #[test]
    fn test_dispatch_relays_mutation() {
        let hub = PresenceHub::new();
        let source = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.connect(ConnectionId::new(), tx);

        dispatch(
            &hub,
            source,
            None,
            r#"{"type":"taskUpdate","data":{"_id":"t1","status":"in_progress"}}"#,
        );
        match rx.try_recv().unwrap().as_ref() {
            ServerEvent::TaskMutated(m) => {
                assert_eq!(m.payload_str(), r#"{"_id":"t1","status":"in_progress"}"#)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
