//! Story lifecycle on top of the pipeline and the store.

use tracing::{debug, info};

use crate::geocode::UNKNOWN_LOCATION;
use crate::pipeline::StoryEnrichmentPipeline;
use crate::types::StoryDraft;
use legacytree_core::{Error, Result, Visibility};
use legacytree_store::{Story, StoryStore, StoryUpdate};

/// Create, read, update and delete enriched stories.
pub struct StoryService<'a> {
    store: &'a StoryStore,
    pipeline: &'a StoryEnrichmentPipeline,
}

impl<'a> StoryService<'a> {
    pub fn new(store: &'a StoryStore, pipeline: &'a StoryEnrichmentPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Enrich and persist a draft. Nothing is stored if enrichment is rejected.
    pub async fn create(&self, draft: StoryDraft) -> Result<Story> {
        let enriched = self.pipeline.enrich(draft).await?;
        let story = self.store.insert_story(&enriched)?;
        info!("Stored story {} '{}'", story.id, story.content.title);
        Ok(story)
    }

    pub fn list(&self, visibility: Option<Visibility>) -> Result<Vec<Story>> {
        self.store.list_stories(visibility)
    }

    pub fn get(&self, id: i64) -> Result<Story> {
        self.store
            .get_story(id)?
            .ok_or_else(|| Error::NotFound(format!("story {}", id)))
    }

    /// Apply a partial update. Any supplied location is geocoded again unless
    /// the caller also supplies both coordinates.
    pub async fn update(&self, id: i64, mut update: StoryUpdate) -> Result<Story> {
        self.get(id)?;
        if update.is_empty() {
            return Err(Error::Validation("No fields to update".into()));
        }
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::Validation("Title cannot be empty".into()));
        }

        if let Some(location) = update.location.take() {
            let location = match location.trim() {
                "" => UNKNOWN_LOCATION.to_string(),
                trimmed => trimmed.to_string(),
            };
            let explicit_coords = update.lat.is_some() && update.lon.is_some();
            if !explicit_coords {
                let place = self.pipeline.geocoder().resolve(&location).await;
                debug!(
                    "Re-geocoded story {} to ({}, {})",
                    id, place.latitude, place.longitude
                );
                update.lat = Some(place.latitude);
                update.lon = Some(place.longitude);
            }
            update.location = Some(location);
        }

        let story = self
            .store
            .update_story(id, &update)?
            .ok_or_else(|| Error::NotFound(format!("story {}", id)))?;
        info!("Updated story {}", id);
        Ok(story)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_story(id)? {
            return Err(Error::NotFound(format!("story {}", id)));
        }
        info!("Deleted story {}", id);
        Ok(())
    }
}
