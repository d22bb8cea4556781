use std::sync::Arc;

use crate::pipeline::TranslationPipeline;
use crate::relay::{ConnectionBinder, MessageRelay};
use crate::session::SessionStore;
use crate::storage::ArtifactStore;

/// Shared application state for HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub binder: ConnectionBinder,
    pub relay: MessageRelay,
    pub pipeline: Arc<TranslationPipeline>,
    pub artifacts: ArtifactStore,
}

impl AppState {
    pub fn new(pipeline: Arc<TranslationPipeline>, artifacts: ArtifactStore) -> Self {
        let store = SessionStore::new();
        let binder = ConnectionBinder::new(store.clone());
        let relay = MessageRelay::new(store.clone(), binder.clone());
        Self {
            store,
            binder,
            relay,
            pipeline,
            artifacts,
        }
    }
}
