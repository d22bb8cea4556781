//! HTTP and WebSocket transport
//!
//! Maps requests onto the session core:
//! - POST /api/session/create - Open a session, caller becomes role_a
//! - POST /api/session/join - Fill role_b of an open session
//! - GET /api/session/:id/info - Session snapshot
//! - GET /api/session/:id/messages - Transcript read
//! - POST /api/message/send - Audio submission through the pipeline
//! - GET /api/audio/:filename - Serve synthesized clips
//! - GET /api/history - Mirrored translation history
//! - GET /api/ws - Realtime channel; join frame binds the connection
//! - GET /api/health - Health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
