use std::sync::Arc;

use crate::config::Config;
use crate::ner::EntityExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Process-wide NER handle. Loaded once; cloned into blocking tasks.
    pub ner: Arc<EntityExtractor>,
}

impl AppState {
    pub fn new(config: Config, ner: EntityExtractor) -> Self {
        Self {
            config,
            ner: Arc::new(ner),
        }
    }
}
