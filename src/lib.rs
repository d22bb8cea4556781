pub mod config;
pub mod http;
pub mod pipeline;
pub mod relay;
pub mod services;
pub mod session;
pub mod storage;

pub use config::Config;
pub use http::{create_router, AppState};
pub use pipeline::{
    SpeechSynthesizer, SpeechToText, Stage, StageFailure, TranslationOutcome, TranslationPipeline,
    Translator,
};
pub use relay::{ConnectionBinder, ConnectionHandle, MessageRelay, PushEvent};
pub use session::{
    JoinOutcome, Message, MessageDraft, ParticipantInfo, Role, SessionError, SessionInfo,
    SessionStore,
};
pub use storage::{ArtifactStore, HistoryEntry};
