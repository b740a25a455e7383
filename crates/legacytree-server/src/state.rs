//! Shared application state.

use std::sync::Arc;

use tracing::info;

use legacytree_chat::{create_conversation_model, SessionManager};
use legacytree_core::{BackendStatus, LegacyTreeConfig, Result};
use legacytree_enrich::{GeocodingAdapter, StoryEnrichmentPipeline, StoryService};
use legacytree_infer::{create_illustrator, create_speech, create_summarizer};
use legacytree_store::StoryStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: LegacyTreeConfig,
    pub store: StoryStore,
    pub pipeline: StoryEnrichmentPipeline,
    pub chat: SessionManager,
}

impl AppState {
    pub fn new(
        config: LegacyTreeConfig,
        store: StoryStore,
        pipeline: StoryEnrichmentPipeline,
        chat: SessionManager,
    ) -> Self {
        Self {
            config,
            store,
            pipeline,
            chat,
        }
    }

    /// Open the store and build every backend from configuration.
    /// Missing model backends degrade to their fallbacks.
    pub fn from_config(config: LegacyTreeConfig) -> Result<Self> {
        let store = StoryStore::open(&config.data_paths.db)?;
        info!("Story database: {}", store.db_path().display());

        let models = &config.models;
        let pipeline = StoryEnrichmentPipeline::new(
            create_summarizer(models),
            Arc::new(create_illustrator(models)),
            create_speech(models),
            Arc::new(GeocodingAdapter::from_config(&config.geocoder)?),
        );
        let chat = SessionManager::new(create_conversation_model(models), &config.chat);

        let state = Self::new(config, store, pipeline, chat);
        let status = state.status();
        if status.fully_loaded() {
            info!("All model backends loaded");
        } else {
            info!(
                "Backends: summarizer={}, illustration={}, speech={}, conversation={}",
                status.summarizer,
                status.illustration_available,
                status.speech_available,
                status.conversation_available
            );
        }
        Ok(state)
    }

    pub fn stories(&self) -> StoryService<'_> {
        StoryService::new(&self.store, &self.pipeline)
    }

    pub fn status(&self) -> BackendStatus {
        self.pipeline.status(self.chat.is_available())
    }
}
