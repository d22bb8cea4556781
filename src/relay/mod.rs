//! Realtime delivery
//!
//! - [`ConnectionBinder`] maps a participant's live connection to their
//!   session role, surviving reconnects (last writer wins)
//! - [`MessageRelay`] appends translated messages to the transcript and
//!   pushes them to the counterpart when connected

mod binder;
mod events;
mod relay;

pub use binder::ConnectionBinder;
pub use events::{ConnectionHandle, PushEvent};
pub use relay::MessageRelay;
