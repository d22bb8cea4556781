use tracing::{debug, info};
use uuid::Uuid;

use super::events::ConnectionHandle;
use crate::session::{Role, SessionStore};

/// Associates a participant's live connection with their session role.
///
/// Bindings are last-writer-wins: a reconnect with a fresh handle
/// replaces the stale one, and pushes to the old handle are dropped by
/// the transport. The binder never owns the connection, it only updates
/// the participant's back-reference through the store.
#[derive(Clone)]
pub struct ConnectionBinder {
    store: SessionStore,
}

impl ConnectionBinder {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Binds `handle` to the role's slot. Returns false when the session
    /// or the role's participant does not exist yet.
    pub async fn bind(&self, session_id: &str, role: Role, handle: ConnectionHandle) -> bool {
        let connection_id = handle.id();
        let bound = self
            .store
            .with_session_mut(session_id, |session| match session.participant_mut(role) {
                Some(participant) => {
                    participant.connection = Some(handle);
                    true
                }
                None => false,
            })
            .await
            .unwrap_or(false);

        if bound {
            info!(
                "Bound connection {} to {} in session {}",
                connection_id, role, session_id
            );
        } else {
            debug!(
                "Refused bind to {} in session {}: no such slot",
                role, session_id
            );
        }
        bound
    }

    /// Best-effort clear on disconnect. Only clears while the slot still
    /// holds this exact connection; a reconnect that already replaced
    /// the handle is left alone.
    pub async fn unbind(&self, session_id: &str, role: Role, connection_id: Uuid) -> bool {
        let cleared = self
            .store
            .with_session_mut(session_id, |session| match session.participant_mut(role) {
                Some(participant)
                    if participant
                        .connection
                        .as_ref()
                        .is_some_and(|handle| handle.id() == connection_id) =>
                {
                    participant.connection = None;
                    true
                }
                _ => false,
            })
            .await
            .unwrap_or(false);

        if cleared {
            debug!(
                "Cleared connection {} from {} in session {}",
                connection_id, role, session_id
            );
        }
        cleared
    }

    /// The other role's current connection handle, if any.
    pub async fn resolve_counterpart(
        &self,
        session_id: &str,
        role: Role,
    ) -> Option<ConnectionHandle> {
        self.store
            .with_session(session_id, |session| {
                session
                    .participant(role.counterpart())
                    .and_then(|participant| participant.connection.clone())
            })
            .await
            .flatten()
    }
}
