use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::binder::ConnectionBinder;
use super::events::PushEvent;
use crate::session::{Message, MessageDraft, Role, SessionError, SessionStore};

/// Appends translated messages to a session transcript and pushes them
/// to the counterpart's live connection when one is bound.
///
/// The guarantee is at-least-stored, best-effort-live: the append is the
/// durable part, the push may be dropped and the counterpart catches up
/// from the transcript.
#[derive(Clone)]
pub struct MessageRelay {
    store: SessionStore,
    binder: ConnectionBinder,
}

impl MessageRelay {
    pub fn new(store: SessionStore, binder: ConnectionBinder) -> Self {
        Self { store, binder }
    }

    /// Constructs the message, appends it under the store lock, then
    /// resolves the counterpart and pushes. Push failures never fail the
    /// call.
    pub async fn publish(
        &self,
        session_id: &str,
        sender_role: Role,
        draft: MessageDraft,
    ) -> Result<Message, SessionError> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            sender_role,
            original_text: draft.original_text,
            translated_text: draft.translated_text,
            audio_url: draft.audio_url,
            source_lang: draft.source_lang,
            target_lang: draft.target_lang,
        };

        self.store
            .with_session_mut(session_id, |session| session.append(message.clone()))
            .await
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        info!(
            "Appended message {} from {} to session {}",
            message.id, sender_role, session_id
        );

        match self.binder.resolve_counterpart(session_id, sender_role).await {
            Some(counterpart) => {
                counterpart.push(PushEvent::NewMessage(message.clone()));
            }
            None => {
                debug!(
                    "No counterpart connection in session {}, message kept for transcript reads",
                    session_id
                );
            }
        }

        Ok(message)
    }

    /// Read-only view of the transcript; see [`SessionStore::history`].
    pub async fn history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, SessionError> {
        self.store.history(session_id, limit).await
    }
}
