use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::relay::ConnectionHandle;

/// One of the two fixed participant slots in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RoleA,
    RoleB,
}

impl Role {
    /// The other slot of the pair.
    pub fn counterpart(self) -> Role {
        match self {
            Role::RoleA => Role::RoleB,
            Role::RoleB => Role::RoleA,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::RoleA => "role_a",
            Role::RoleB => "role_b",
        }
    }

    /// Parses the wire form (`"role_a"` / `"role_b"`).
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "role_a" => Some(Role::RoleA),
            "role_b" => Some(Role::RoleB),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant occupying one role slot. Name and language never change
/// after join; the connection handle is overwritten on every (re)connect.
#[derive(Debug, Clone)]
pub struct Participant {
    pub display_name: String,
    pub language: String,
    pub(crate) connection: Option<ConnectionHandle>,
}

impl Participant {
    pub(crate) fn new(display_name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            language: language.into(),
            connection: None,
        }
    }

    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            name: self.display_name.clone(),
            language: self.language.clone(),
            connected: self.connection.is_some(),
        }
    }
}

/// Wire-safe snapshot of a participant (no connection handle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub name: String,
    pub language: String,
    pub connected: bool,
}

/// A translated message in a session transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sender_role: Role,
    pub original_text: String,
    pub translated_text: String,
    pub audio_url: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Payload for a message about to be published; the relay fills in the
/// id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDraft {
    pub original_text: String,
    pub translated_text: String,
    pub audio_url: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Returned to the second participant on a successful join.
#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub role: Role,
    pub other_user: ParticipantInfo,
}

/// Wire-safe snapshot of a whole session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub role_a: Option<ParticipantInfo>,
    pub role_b: Option<ParticipantInfo>,
    pub complete: bool,
}

/// A pairing context between two participants. The creator always holds
/// `role_a`; `role_b` is filled exactly once by a join. The transcript is
/// append-only and its order is the display order.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    host: Participant,
    guest: Option<Participant>,
    transcript: Vec<Message>,
}

impl Session {
    pub(crate) fn new(id: String, host: Participant) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            host,
            guest: None,
            transcript: Vec::new(),
        }
    }

    pub fn participant(&self, role: Role) -> Option<&Participant> {
        match role {
            Role::RoleA => Some(&self.host),
            Role::RoleB => self.guest.as_ref(),
        }
    }

    pub(crate) fn participant_mut(&mut self, role: Role) -> Option<&mut Participant> {
        match role {
            Role::RoleA => Some(&mut self.host),
            Role::RoleB => self.guest.as_mut(),
        }
    }

    /// Fills `role_b` if it is still empty, returning a snapshot of the
    /// host for the joiner. The check-and-set runs under the store's
    /// write lock, so concurrent joins see exactly one winner.
    pub(crate) fn admit(&mut self, guest: Participant) -> Result<ParticipantInfo, super::SessionError> {
        if self.guest.is_some() {
            return Err(super::SessionError::SessionFull(self.id.clone()));
        }
        self.guest = Some(guest);
        Ok(self.host.info())
    }

    /// Both slots occupied.
    pub fn is_complete(&self) -> bool {
        self.guest.is_some()
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id.clone(),
            created_at: self.created_at,
            role_a: Some(self.host.info()),
            role_b: self.guest.as_ref().map(Participant::info),
            complete: self.is_complete(),
        }
    }
}
