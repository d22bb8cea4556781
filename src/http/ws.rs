use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::relay::{ConnectionHandle, PushEvent};
use crate::session::Role;

/// First frame a client sends after connecting; binds the socket to its
/// session role. A later frame on the same socket rebinds it.
#[derive(Debug, Deserialize)]
struct JoinFrame {
    session_id: String,
    user_role: Role,
}

/// GET /api/ws
pub async fn ws_upgrade(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<PushEvent>();
    let handle = ConnectionHandle::new(tx);
    let connection_id = handle.id();

    debug!("WebSocket connected: {}", connection_id);

    // Outbound pump: relay events become JSON text frames.
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to encode push event: {}", e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut bound: Option<(String, Role)> = None;
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(_) => break,
        };
        match frame {
            WsMessage::Text(text) => {
                let join: JoinFrame = match serde_json::from_str(&text) {
                    Ok(join) => join,
                    Err(e) => {
                        debug!("Ignoring unrecognized frame: {}", e);
                        continue;
                    }
                };
                if state
                    .binder
                    .bind(&join.session_id, join.user_role, handle.clone())
                    .await
                {
                    info!(
                        "Connection {} bound to {} in session {}",
                        connection_id, join.user_role, join.session_id
                    );
                    handle.push(PushEvent::SessionJoined {
                        session_id: join.session_id.clone(),
                    });
                    bound = Some((join.session_id, join.user_role));
                } else {
                    warn!(
                        "Bind refused for session {}: unknown session or empty slot",
                        join.session_id
                    );
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    // Best effort: leave the slot clean unless a reconnect already
    // replaced this handle.
    if let Some((session_id, role)) = bound {
        state.binder.unbind(&session_id, role, connection_id).await;
    }
    send_task.abort();

    debug!("WebSocket closed: {}", connection_id);
}
