use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::session::Message;

/// Event pushed over a participant's realtime channel. Tagged so clients
/// can switch on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A translated message from the counterpart.
    NewMessage(Message),
    /// The second participant joined the session.
    PeerJoined {
        user_name: String,
        user_language: String,
    },
    /// Ack that this connection is bound to its session role.
    SessionJoined { session_id: String },
}

/// Handle to a participant's live realtime connection.
///
/// The handle is weak: the session owns the participant, the
/// participant only remembers the latest handle, and a reconnect simply
/// overwrites it. Pushing is fire-and-forget; a handle whose connection
/// has gone away drops the event, and the transcript already has it.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    tx: mpsc::UnboundedSender<PushEvent>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::UnboundedSender<PushEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    /// Identity of the underlying connection, used to detect stale
    /// unbinds after a reconnect.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Best-effort push. Returns whether the connection was still
    /// accepting events; failure is captured as a diagnostic only.
    pub fn push(&self, event: PushEvent) -> bool {
        let delivered = self.tx.send(event).is_ok();
        if !delivered {
            warn!("Dropped push to stale connection {}", self.id);
        }
        delivered
    }
}
