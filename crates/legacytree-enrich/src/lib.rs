//! LegacyTree Enrich: geocoding, title and theme classification, and the
//! story enrichment pipeline.

pub mod classify;
pub mod geocode;
pub mod pipeline;
pub mod service;
pub mod types;

pub use classify::{classify_theme, classify_title, theme_scores, ThemeScore};
pub use geocode::{GeocodeProvider, GeocodeResult, GeocodingAdapter, NominatimProvider, Place};
pub use pipeline::{StoryEnrichmentPipeline, AUDIO_PLACEHOLDER};
pub use service::StoryService;
pub use types::{StoryDraft, TextAnalysis};
