//! Story records.

use chrono::{DateTime, NaiveDate, Utc};
use legacytree_core::{Theme, Visibility};
use serde::{Deserialize, Serialize};

/// A fully enriched story, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedStory {
    pub title: String,
    pub summary: String,
    pub theme: Theme,
    /// Location as typed by the user, never the geocoder's canonical form.
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub message_to_future: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub illustration_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// A persisted story row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    #[serde(flatten)]
    pub content: EnrichedStory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub theme: Option<Theme>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub date: Option<NaiveDate>,
    pub message_to_future: Option<String>,
    pub visibility: Option<Visibility>,
    pub illustration_url: Option<String>,
}

impl StoryUpdate {
    /// Whether the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.theme.is_none()
            && self.location.is_none()
            && self.lat.is_none()
            && self.lon.is_none()
            && self.date.is_none()
            && self.message_to_future.is_none()
            && self.visibility.is_none()
            && self.illustration_url.is_none()
    }

    /// Merge the present fields into `story`.
    pub fn apply_to(&self, story: &mut EnrichedStory) {
        if let Some(v) = &self.title {
            story.title = v.clone();
        }
        if let Some(v) = &self.summary {
            story.summary = v.clone();
        }
        if let Some(v) = self.theme {
            story.theme = v;
        }
        if let Some(v) = &self.location {
            story.location = v.clone();
        }
        if let Some(v) = self.lat {
            story.lat = v;
        }
        if let Some(v) = self.lon {
            story.lon = v;
        }
        if let Some(v) = self.date {
            story.date = v;
        }
        if let Some(v) = &self.message_to_future {
            story.message_to_future = Some(v.clone());
        }
        if let Some(v) = self.visibility {
            story.visibility = v;
        }
        if let Some(v) = &self.illustration_url {
            story.illustration_url = Some(v.clone());
        }
    }
}
