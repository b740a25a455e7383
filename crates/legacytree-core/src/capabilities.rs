//! Backend availability reporting.

use serde::{Deserialize, Serialize};

/// How the summarizer produces output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerMode {
    /// Abstractive model with truncation fallback on error.
    Model,
    /// Deterministic truncation only (lightweight mode).
    Fallback,
}

impl std::fmt::Display for SummarizerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Which optional backends were loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatus {
    pub summarizer: SummarizerMode,
    pub illustration_available: bool,
    pub speech_available: bool,
    pub conversation_available: bool,
    /// Name of the geocoding provider in use.
    pub geocoder: String,
}

impl BackendStatus {
    /// True when every model-backed feature is usable.
    pub fn fully_loaded(&self) -> bool {
        self.summarizer == SummarizerMode::Model
            && self.illustration_available
            && self.speech_available
            && self.conversation_available
    }
}
