//! Story enrichment: draft → summary, title, theme, coordinates, illustration.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::classify::{classify_theme, classify_title};
use crate::geocode::{GeocodingAdapter, UNKNOWN_LOCATION};
use crate::types::{StoryDraft, TextAnalysis};
use legacytree_core::{BackendStatus, Error, Result};
use legacytree_infer::{
    resolve_language, IllustrationGenerator, SpeechBackend, Summarizer, DEFAULT_STYLE,
};
use legacytree_store::EnrichedStory;

/// Analysed in place of a transcript when audio could not be transcribed.
pub const AUDIO_PLACEHOLDER: &str = "Audio story uploaded";

/// Orchestrates the enrichment steps. Holds no storage; callers persist the result.
pub struct StoryEnrichmentPipeline {
    summarizer: Arc<dyn Summarizer>,
    illustrator: Arc<IllustrationGenerator>,
    speech: Arc<dyn SpeechBackend>,
    geocoder: Arc<GeocodingAdapter>,
}

impl StoryEnrichmentPipeline {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        illustrator: Arc<IllustrationGenerator>,
        speech: Arc<dyn SpeechBackend>,
        geocoder: Arc<GeocodingAdapter>,
    ) -> Self {
        Self {
            summarizer,
            illustrator,
            speech,
            geocoder,
        }
    }

    pub fn summarizer(&self) -> &Arc<dyn Summarizer> {
        &self.summarizer
    }

    pub fn illustrator(&self) -> &Arc<IllustrationGenerator> {
        &self.illustrator
    }

    pub fn speech(&self) -> &Arc<dyn SpeechBackend> {
        &self.speech
    }

    pub fn geocoder(&self) -> &Arc<GeocodingAdapter> {
        &self.geocoder
    }

    /// Availability of the optional backends. Conversation is reported by its owner.
    pub fn status(&self, conversation_available: bool) -> BackendStatus {
        BackendStatus {
            summarizer: self.summarizer.mode(),
            illustration_available: self.illustrator.is_available(),
            speech_available: self.speech.is_available(),
            conversation_available,
            geocoder: self.geocoder.provider_name().to_string(),
        }
    }

    /// Summary, title and theme for a piece of text.
    pub async fn analyze(&self, text: &str) -> TextAnalysis {
        TextAnalysis {
            summary: self.summarizer.summarize(text).await,
            title: classify_title(text),
            theme: classify_theme(text),
        }
    }

    /// Enrich a draft. Only a draft with neither transcript nor audio, or with
    /// an unsupported language, is an error; every other failure degrades to
    /// that step's fallback.
    pub async fn enrich(&self, draft: StoryDraft) -> Result<EnrichedStory> {
        if draft.transcript_text().is_none() && !draft.has_audio() {
            return Err(Error::Validation(
                "Either a transcript or an audio recording is required".into(),
            ));
        }
        let language = resolve_language(draft.language.as_deref())?;

        let transcript = match draft.transcript_text() {
            Some(text) => Some(text.to_string()),
            None => {
                self.transcribe(draft.audio.as_deref().unwrap_or_default(), language)
                    .await
            }
        };
        let text = transcript.as_deref().unwrap_or(AUDIO_PLACEHOLDER);

        let location = draft
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(UNKNOWN_LOCATION)
            .to_string();
        let style = draft.style.as_deref().unwrap_or(DEFAULT_STYLE);

        let illustrate = async {
            match (draft.generate_illustration, transcript.as_deref()) {
                (true, Some(real)) => self
                    .illustrator
                    .generate(real, style)
                    .await
                    .map(|i| i.data_uri),
                _ => None,
            }
        };

        let (summary, place, illustration_url) = tokio::join!(
            self.summarizer.summarize(text),
            self.geocoder.resolve(&location),
            illustrate,
        );
        let title = classify_title(text);
        let theme = classify_theme(text);

        if draft.generate_illustration && illustration_url.is_none() {
            debug!("Story enriched without illustration");
        }
        info!("Enriched story '{}' (theme {}, {})", title, theme, location);

        Ok(EnrichedStory {
            title,
            summary,
            theme,
            location,
            lat: place.latitude,
            lon: place.longitude,
            date: draft.date.unwrap_or_else(|| Utc::now().date_naive()),
            message_to_future: draft.message_to_future,
            visibility: draft.visibility,
            illustration_url,
            audio_path: draft.audio_path,
            image_path: draft.image_path,
        })
    }

    async fn transcribe(&self, audio: &[u8], language: &str) -> Option<String> {
        if !self.speech.is_available() {
            warn!("No speech model available, storing audio story with placeholder text");
            return None;
        }
        let text = self.speech.transcribe(audio, language).await;
        if text.is_none() {
            warn!("Audio transcription failed, storing audio story with placeholder text");
        }
        text
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::geocode::testing::TableProvider;
    use legacytree_infer::{FallbackSummarizer, NoopSpeech};
    use std::time::Duration;

    /// Pipeline with fallback models and a table geocoder knowing Mumbai and Toronto.
    pub fn offline_pipeline() -> StoryEnrichmentPipeline {
        let provider = TableProvider::new(vec![
            ("Mumbai", 19.0760, 72.8777, "Mumbai, Maharashtra, India"),
            ("Toronto", 43.6532, -79.3832, "Toronto, Ontario, Canada"),
            ("Lisbon", 38.7223, -9.1393, "Lisboa, Portugal"),
        ]);
        StoryEnrichmentPipeline::new(
            Arc::new(FallbackSummarizer),
            Arc::new(IllustrationGenerator::unavailable()),
            Arc::new(NoopSpeech),
            Arc::new(GeocodingAdapter::new(Arc::new(provider), Duration::ZERO)),
        )
    }
}
