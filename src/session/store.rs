use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::SessionError;
use super::types::{JoinOutcome, Message, Participant, Role, Session, SessionInfo};

/// Alphabet for session codes: uppercase alphanumerics minus the
/// easily-confused 0/O/1/I, so codes survive being read aloud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 32;

/// In-memory registry of sessions. This is the system's only shared
/// mutable resource: every mutation runs under the write lock, which
/// also makes the join check-and-set atomic. Pipeline work never runs
/// while the lock is held.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new session with the caller in `role_a`.
    pub async fn create(
        &self,
        name: &str,
        language: &str,
    ) -> Result<(String, Role), SessionError> {
        let mut sessions = self.sessions.write().await;

        let id = Self::allocate_code(&sessions)?;
        let session = Session::new(id.clone(), Participant::new(name, language));
        sessions.insert(id.clone(), session);

        info!("Created session {} for {} ({})", id, name, language);
        Ok((id, Role::RoleA))
    }

    /// Fills `role_b` of an open session. Exactly one of any number of
    /// concurrent joins succeeds; the rest observe `SessionFull`.
    pub async fn join(
        &self,
        session_id: &str,
        name: &str,
        language: &str,
    ) -> Result<JoinOutcome, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        let other_user = session.admit(Participant::new(name, language))?;

        info!("{} ({}) joined session {}", name, language, session_id);
        Ok(JoinOutcome {
            role: Role::RoleB,
            other_user,
        })
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionInfo, SessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(Session::info)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub async fn exists(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Explicit cleanup; sessions are never removed implicitly.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            info!("Removed session {}", session_id);
        }
        removed
    }

    /// The most recent `limit` messages in chronological order, or the
    /// whole transcript when `limit` is zero.
    pub async fn history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, SessionError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        let transcript = session.transcript();
        let start = if limit == 0 {
            0
        } else {
            transcript.len().saturating_sub(limit)
        };
        Ok(transcript[start..].to_vec())
    }

    /// Runs `f` against a session under the read lock. `None` when the
    /// id is unknown. Callers must keep `f` short and non-blocking.
    pub(crate) async fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&Session) -> R,
    ) -> Option<R> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(f)
    }

    /// Mutating counterpart of [`with_session`](Self::with_session).
    pub(crate) async fn with_session_mut<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(f)
    }

    fn allocate_code(sessions: &HashMap<String, Session>) -> Result<String, SessionError> {
        let mut rng = rand::thread_rng();
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !sessions.contains_key(&code) {
                return Ok(code);
            }
            debug!("Session code collision on attempt {}", attempt + 1);
        }
        Err(SessionError::AllocationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_use_the_unambiguous_alphabet() {
        let sessions = HashMap::new();
        for _ in 0..100 {
            let code = SessionStore::allocate_code(&sessions).unwrap();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn allocation_retries_past_occupied_codes() {
        let mut sessions = HashMap::new();
        let taken = SessionStore::allocate_code(&sessions).unwrap();
        sessions.insert(
            taken.clone(),
            Session::new(taken.clone(), Participant::new("a", "en")),
        );

        let fresh = SessionStore::allocate_code(&sessions).unwrap();
        assert_ne!(fresh, taken);
    }
}
