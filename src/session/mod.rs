//! Session coordination core
//!
//! This module owns all session state:
//! - Two-slot sessions keyed by short pairing codes
//! - Participant records and their (weak) connection handles
//! - Append-only transcripts of translated messages
//!
//! The [`SessionStore`] is the single authoritative owner; the connection
//! binder and message relay only reach session records through its
//! accessors.

mod error;
mod store;
mod types;

pub use error::SessionError;
pub use store::SessionStore;
pub use types::{
    JoinOutcome, Message, MessageDraft, Participant, ParticipantInfo, Role, Session, SessionInfo,
};
