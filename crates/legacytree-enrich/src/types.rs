//! Pipeline input and analysis output.

use chrono::NaiveDate;
use legacytree_core::{Theme, Visibility};
use serde::{Deserialize, Serialize};

/// A story as submitted, before enrichment. Consumed by the pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryDraft {
    #[serde(default)]
    pub transcript: Option<String>,
    /// Recorded audio. Required when there is no transcript.
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
    #[serde(default)]
    pub location: Option<String>,
    /// Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub message_to_future: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub generate_illustration: bool,
    /// Illustration style hint, `realistic` when absent.
    #[serde(default)]
    pub style: Option<String>,
    /// Spoken language of the audio, `en` when absent.
    #[serde(default)]
    pub language: Option<String>,
    /// Where the uploaded audio was saved, set by the upload handler.
    #[serde(skip)]
    pub audio_path: Option<String>,
    #[serde(skip)]
    pub image_path: Option<String>,
}

impl StoryDraft {
    /// Draft with just a transcript.
    pub fn from_transcript(text: impl Into<String>) -> Self {
        Self {
            transcript: Some(text.into()),
            ..Default::default()
        }
    }

    /// Transcript text if it has any non-whitespace content.
    pub fn transcript_text(&self) -> Option<&str> {
        self.transcript
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        self.audio.as_ref().is_some_and(|a| !a.is_empty())
    }
}

/// Summary, title and theme derived from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub summary: String,
    pub title: String,
    pub theme: Theme,
}
