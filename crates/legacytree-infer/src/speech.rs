//! Speech-to-text and text-to-speech backends.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::InferenceClient;
use legacytree_core::{Error, ModelConfig, Result};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Playback speed requested when slow speech is asked for.
pub const SLOW_SPEED: f64 = 0.75;

/// Language codes accepted for transcription and synthesis, with display names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("hi", "Hindi"),
    ("ar", "Arabic"),
];

pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Normalize an optional language code. Absent or blank means English;
/// anything outside [`SUPPORTED_LANGUAGES`] is a validation error.
pub fn resolve_language(code: Option<&str>) -> Result<&'static str> {
    let code = match code.map(|c| c.trim().to_lowercase()) {
        None => return Ok(DEFAULT_LANGUAGE),
        Some(c) if c.is_empty() => return Ok(DEFAULT_LANGUAGE),
        Some(c) => c,
    };
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(c, _)| *c)
        .ok_or_else(|| Error::Validation(format!("Unsupported language '{}'", code)))
}

/// Speech recognition and synthesis.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Transcribe recorded audio spoken in `language`. `None` when unavailable
    /// or nothing was recognised.
    async fn transcribe(&self, audio: &[u8], language: &str) -> Option<String>;

    /// Synthesize speech as a `data:audio/...;base64,` URI.
    async fn synthesize(&self, text: &str, language: &str, slow: bool) -> Option<String>;

    fn is_available(&self) -> bool;
}

/// Placeholder backend used when no speech models are configured.
pub struct NoopSpeech;

#[async_trait]
impl SpeechBackend for NoopSpeech {
    async fn transcribe(&self, _audio: &[u8], _language: &str) -> Option<String> {
        None
    }

    async fn synthesize(&self, _text: &str, _language: &str, _slow: bool) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Hosted Whisper transcription plus a hosted TTS model.
pub struct HostedSpeech {
    client: InferenceClient,
    transcription_model: String,
    synthesis_model: String,
}

impl HostedSpeech {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        if !config.backends_enabled() {
            return Err(Error::Unavailable(
                "no inference endpoint or API token configured".into(),
            ));
        }
        Ok(Self {
            client: InferenceClient::new(config)?,
            transcription_model: config.transcription_model.clone(),
            synthesis_model: config.synthesis_model.clone(),
        })
    }

    async fn try_transcribe(&self, audio: &[u8], language: &str) -> Result<String> {
        let response = self
            .client
            .post_json(&self.transcription_model, &transcription_request(audio, language))
            .await?;
        response["text"]
            .as_str()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| Error::Inference("response has no text".into()))
    }

    async fn try_synthesize(&self, text: &str, language: &str, slow: bool) -> Result<String> {
        let output = self
            .client
            .post_json_for_bytes(&self.synthesis_model, &synthesis_request(text, language, slow))
            .await?;
        if !output.mime.starts_with("audio/") {
            return Err(Error::Inference(format!("Unexpected audio type {}", output.mime)));
        }
        Ok(output.to_data_uri())
    }
}

/// Whisper request: base64 audio with the spoken language pinned.
fn transcription_request(audio: &[u8], language: &str) -> Value {
    json!({
        "inputs": general_purpose::STANDARD.encode(audio),
        "parameters": {
            "generate_kwargs": { "language": language, "task": "transcribe" }
        }
    })
}

fn synthesis_request(text: &str, language: &str, slow: bool) -> Value {
    json!({
        "inputs": text,
        "parameters": {
            "language": language,
            "speed": if slow { SLOW_SPEED } else { 1.0 },
        }
    })
}

#[async_trait]
impl SpeechBackend for HostedSpeech {
    async fn transcribe(&self, audio: &[u8], language: &str) -> Option<String> {
        if audio.is_empty() {
            return None;
        }
        match self.try_transcribe(audio, language).await {
            Ok(text) if !text.is_empty() => {
                info!("Speech transcribed: {} chars", text.len());
                Some(text)
            }
            Ok(_) => {
                warn!("Speech-to-text returned no text");
                None
            }
            Err(e) => {
                warn!("Error in speech-to-text: {}", e);
                None
            }
        }
    }

    async fn synthesize(&self, text: &str, language: &str, slow: bool) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        match self.try_synthesize(text, language, slow).await {
            Ok(uri) => Some(uri),
            Err(e) => {
                warn!("Error in text-to-speech: {}", e);
                None
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}
