use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))
        // Session lifecycle
        .route("/api/session/create", post(handlers::create_session))
        .route("/api/session/join", post(handlers::join_session))
        .route(
            "/api/session/:session_id/info",
            get(handlers::get_session_info),
        )
        .route(
            "/api/session/:session_id/messages",
            get(handlers::get_messages),
        )
        // Translation submissions and artifacts
        .route("/api/message/send", post(handlers::send_message))
        .route("/api/audio/:filename", get(handlers::get_audio))
        .route("/api/history", get(handlers::get_history))
        // Realtime channel
        .route("/api/ws", get(ws::ws_upgrade))
        // Voice clips can exceed the 2 MB default body limit
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
