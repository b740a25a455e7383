//! Demo stories for a fresh installation.

use chrono::NaiveDate;
use tracing::info;

use legacytree_core::{Error, Result, Theme, Visibility};
use legacytree_store::{EnrichedStory, Story, StoryStore};

struct DemoStory {
    title: &'static str,
    summary: &'static str,
    theme: Theme,
    location: &'static str,
    lat: f64,
    lon: f64,
    date: (i32, u32, u32),
}

const DEMO_STORIES: &[DemoStory] = &[
    DemoStory {
        title: "Where I Met Your Grandfather",
        summary: "During the war, I met your grandfather in a small village. We shared stories \
                  under the stars, and that night changed my life forever. Our love grew amidst \
                  hardship, teaching us the value of hope and resilience.\n\nYears later, we \
                  returned to that village, planting a tree to remember our beginnings. That \
                  tree still stands, a symbol of our enduring love and the roots of our family.",
        theme: Theme::Love,
        location: "Toronto, Canada",
        lat: 43.6532,
        lon: -79.3832,
        date: (1944, 6, 12),
    },
    DemoStory {
        title: "The Great Migration",
        summary: "Leaving India for Canada was both exciting and terrifying. I packed only what \
                  I could carry, but brought with me a heart full of dreams.\n\nThe journey \
                  taught me about courage, faith, and the importance of family. Every challenge \
                  became a lesson, and every friend a blessing.",
        theme: Theme::Tradition,
        location: "Mumbai, India",
        lat: 19.0760,
        lon: 72.8777,
        date: (1962, 9, 1),
    },
];

impl DemoStory {
    fn to_enriched(&self) -> Result<EnrichedStory> {
        let (y, m, d) = self.date;
        let date = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| Error::Internal(format!("Invalid demo date for '{}'", self.title)))?;
        Ok(EnrichedStory {
            title: self.title.to_string(),
            summary: self.summary.to_string(),
            theme: self.theme,
            location: self.location.to_string(),
            lat: self.lat,
            lon: self.lon,
            date,
            message_to_future: None,
            visibility: Visibility::Public,
            illustration_url: None,
            audio_path: None,
            image_path: None,
        })
    }
}

/// Insert the demo stories. Already-present titles are skipped.
pub fn seed_demo_stories(store: &StoryStore) -> Result<Vec<Story>> {
    let existing = store.list_stories(None)?;
    let mut inserted = Vec::new();
    for demo in DEMO_STORIES {
        if existing.iter().any(|s| s.content.title == demo.title) {
            info!("Demo story already present: {}", demo.title);
            continue;
        }
        inserted.push(store.insert_story(&demo.to_enriched()?)?);
    }
    info!("Seeded {} demo stories", inserted.len());
    Ok(inserted)
}
