use super::state::AppState;
use crate::relay::PushEvent;
use crate::session::{Message, MessageDraft, ParticipantInfo, Role, SessionError};
use crate::storage::HistoryEntry;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_name: String,
    pub user_language: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub user_role: Role,
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub session_id: String,
    pub user_name: String,
    pub user_language: String,
}

#[derive(Debug, Serialize)]
pub struct JoinSessionResponse {
    pub user_role: Role,
    pub other_user: ParticipantInfo,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub transcription: String,
    pub translation: String,
    pub audio_url: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn session_error_response(err: SessionError) -> Response {
    let status = match err {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::SessionFull(_) => StatusCode::CONFLICT,
        SessionError::AllocationFailed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/session/create
/// Open a new session with the caller as `role_a`
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let user_name = req.user_name.trim();
    let user_language = req.user_language.trim();
    if user_name.is_empty() || user_language.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_name and user_language are required",
        );
    }

    match state.store.create(user_name, user_language).await {
        Ok((session_id, user_role)) => (
            StatusCode::OK,
            Json(CreateSessionResponse {
                session_id,
                user_role,
            }),
        )
            .into_response(),
        Err(e) => session_error_response(e),
    }
}

/// POST /api/session/join
/// Join an open session as `role_b`
pub async fn join_session(
    State(state): State<AppState>,
    Json(req): Json<JoinSessionRequest>,
) -> Response {
    let user_name = req.user_name.trim();
    let user_language = req.user_language.trim();
    if req.session_id.is_empty() || user_name.is_empty() || user_language.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "session_id, user_name and user_language are required",
        );
    }

    match state.store.join(&req.session_id, user_name, user_language).await {
        Ok(outcome) => {
            // Tell the waiting creator their counterpart arrived.
            if let Some(creator) = state
                .binder
                .resolve_counterpart(&req.session_id, outcome.role)
                .await
            {
                creator.push(PushEvent::PeerJoined {
                    user_name: user_name.to_string(),
                    user_language: user_language.to_string(),
                });
            }

            (
                StatusCode::OK,
                Json(JoinSessionResponse {
                    user_role: outcome.role,
                    other_user: outcome.other_user,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response(e),
    }
}

/// GET /api/session/:session_id/info
pub async fn get_session_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.store.get(&session_id).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => session_error_response(e),
    }
}

/// GET /api/session/:session_id/messages?limit=N
/// Transcript read; most recent `limit` messages in chronological order
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Response {
    match state
        .relay
        .history(&session_id, query.limit.unwrap_or(0))
        .await
    {
        Ok(messages) => (StatusCode::OK, Json(MessagesResponse { messages })).into_response(),
        Err(e) => session_error_response(e),
    }
}

/// POST /api/message/send
/// Multipart submission: audio clip + session_id, user_role, source_lang,
/// target_lang. Runs the translation pipeline, then publishes the result.
pub async fn send_message(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut audio: Option<Vec<u8>> = None;
    let mut session_id: Option<String> = None;
    let mut user_role: Option<String> = None;
    let mut source_lang: Option<String> = None;
    let mut target_lang: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("invalid multipart payload: {}", e),
                )
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "audio" => match field.bytes().await {
                Ok(bytes) => audio = Some(bytes.to_vec()),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("failed to read audio part: {}", e),
                    )
                }
            },
            "session_id" | "user_role" | "source_lang" | "target_lang" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read {} field: {}", name, e),
                        )
                    }
                };
                match name.as_str() {
                    "session_id" => session_id = Some(value),
                    "user_role" => user_role = Some(value),
                    "source_lang" => source_lang = Some(value),
                    _ => target_lang = Some(value),
                }
            }
            _ => {}
        }
    }

    let (Some(audio), Some(session_id), Some(user_role), Some(source_lang), Some(target_lang)) =
        (audio, session_id, user_role, source_lang, target_lang)
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "audio, session_id, user_role, source_lang and target_lang are required",
        );
    };

    let Some(sender_role) = Role::parse(&user_role) else {
        return error_response(StatusCode::BAD_REQUEST, "user_role must be role_a or role_b");
    };

    if !state.store.exists(&session_id).await {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("session {} not found", session_id),
        );
    }

    // Keep the raw clip for the mirror; never fatal.
    if let Err(e) = state.artifacts.save_input_audio(&audio).await {
        warn!("Failed to mirror input audio: {:#}", e);
    }

    // The three external calls run here, outside any store lock. Nothing
    // is written to the transcript unless all of them succeed.
    let outcome = match state
        .pipeline
        .submit(&audio, &source_lang, &target_lang)
        .await
    {
        Ok(outcome) => outcome,
        Err(failure) => return error_response(StatusCode::BAD_GATEWAY, failure.to_string()),
    };

    let draft = MessageDraft {
        original_text: outcome.original_text,
        translated_text: outcome.translated_text,
        audio_url: outcome.audio_url,
        source_lang,
        target_lang,
    };

    match state.relay.publish(&session_id, sender_role, draft).await {
        Ok(message) => {
            state.artifacts.mirror_message(&session_id, &message).await;
            info!(
                "Message {} published to session {}",
                message.id, session_id
            );
            (
                StatusCode::OK,
                Json(SendMessageResponse {
                    transcription: message.original_text,
                    translation: message.translated_text,
                    audio_url: message.audio_url,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response(e),
    }
}

/// GET /api/audio/:filename
/// Serve a synthesized clip. No caching so a reused filename never plays
/// a stale clip.
pub async fn get_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(path) = state.artifacts.output_path(&filename) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid audio filename");
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => error_response(
            StatusCode::NOT_FOUND,
            format!("audio file {} not found", filename),
        ),
    }
}

/// GET /api/history?limit=N
/// Global translation history from the best-effort disk mirror
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let history = state.artifacts.history_tail(query.limit.unwrap_or(10)).await;
    (StatusCode::OK, Json(HistoryResponse { history })).into_response()
}

/// GET /api/health
pub async fn health_check() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now(),
        })),
    )
        .into_response()
}
