use thiserror::Error;

/// Errors surfaced by the session store and message relay.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} already has two participants")]
    SessionFull(String),

    #[error("exhausted retries generating a unique session code")]
    AllocationFailed,
}
