//! LegacyTree Infer: model backends for summarization, illustration and speech.
//!
//! Every backend is optional. When model support is disabled or no inference
//! endpoint is configured, the factories below return the fallback
//! implementation and the rest of the system keeps working:
//! truncation summaries, no illustrations, no speech.

pub mod client;
pub mod illustration;
pub mod speech;
pub mod summarizer;

pub use client::{data_uri, BinaryOutput, InferenceClient};
pub use illustration::{
    build_prompt, HostedImageModel, Illustration, IllustrationGenerator, ImageModel, RenderParams,
    DEFAULT_STYLE,
};
pub use speech::{
    language_name, resolve_language, HostedSpeech, NoopSpeech, SpeechBackend, DEFAULT_LANGUAGE,
    SUPPORTED_LANGUAGES,
};
pub use summarizer::{clean_text, fallback_summary, FallbackSummarizer, ModelSummarizer, Summarizer};

use std::sync::Arc;

use legacytree_core::ModelConfig;

/// Create the best available summarizer.
///
/// Tries the hosted model first, falls back to truncation-only mode.
pub fn create_summarizer(config: &ModelConfig) -> Arc<dyn Summarizer> {
    if !config.use_ai_model {
        tracing::info!("Running summarizer in lightweight mode (no AI model)");
        return Arc::new(FallbackSummarizer);
    }

    match ModelSummarizer::load(config) {
        Ok(summarizer) => {
            tracing::info!("Summarization model loaded: {}", summarizer.model());
            Arc::new(summarizer)
        }
        Err(e) => {
            tracing::warn!("Summarization model unavailable: {}. Falling back to truncation.", e);
            Arc::new(FallbackSummarizer)
        }
    }
}

/// Create the illustration generator, unavailable if no image model can be used.
pub fn create_illustrator(config: &ModelConfig) -> IllustrationGenerator {
    match HostedImageModel::load(config) {
        Ok(model) => {
            tracing::info!("Illustration model configured: {}", config.illustration_model);
            IllustrationGenerator::new(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!("Illustration model unavailable: {}", e);
            IllustrationGenerator::unavailable()
        }
    }
}

/// Create the speech backend, `NoopSpeech` if no speech models can be used.
pub fn create_speech(config: &ModelConfig) -> Arc<dyn SpeechBackend> {
    match HostedSpeech::load(config) {
        Ok(speech) => {
            tracing::info!(
                "Speech models configured: stt={}, tts={}",
                config.transcription_model,
                config.synthesis_model
            );
            Arc::new(speech)
        }
        Err(e) => {
            tracing::warn!("Speech models unavailable: {}", e);
            Arc::new(NoopSpeech)
        }
    }
}
