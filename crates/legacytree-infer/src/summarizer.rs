//! Story summarization.
//!
//! Two implementations of [`Summarizer`]:
//! - [`ModelSummarizer`]: hosted abstractive model, falls back to truncation on any error
//! - [`FallbackSummarizer`]: truncation only (lightweight mode)
//!
//! Both pass very short texts through unchanged after whitespace cleanup.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::InferenceClient;
use legacytree_core::{Error, ModelConfig, Result, SummarizerMode};

/// Model input is cut to this many characters.
pub const MAX_INPUT_CHARS: usize = 1000;
/// Texts with fewer words than this are returned as-is.
pub const PASS_THROUGH_WORDS: usize = 20;
/// Word budget of the truncation fallback.
pub const FALLBACK_WORDS: usize = 50;
pub const DEFAULT_MAX_LENGTH: usize = 150;
pub const DEFAULT_MIN_LENGTH: usize = 50;

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a transcript. Never fails; degrades to truncation.
    async fn summarize(&self, text: &str) -> String;

    fn mode(&self) -> SummarizerMode;

    /// Whether a model backend is loaded.
    fn is_available(&self) -> bool {
        self.mode() == SummarizerMode::Model
    }
}

/// Collapse whitespace and bound the length handed to a model.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

/// First [`FALLBACK_WORDS`] words plus an ellipsis, or the whole text if shorter.
pub fn fallback_summary(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > FALLBACK_WORDS {
        format!("{}...", words[..FALLBACK_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns the cleaned text when it is too short to be worth summarizing.
fn pass_through(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    (word_count(&cleaned) < PASS_THROUGH_WORDS).then_some(cleaned)
}

/// Deterministic truncation summarizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackSummarizer;

#[async_trait]
impl Summarizer for FallbackSummarizer {
    async fn summarize(&self, text: &str) -> String {
        pass_through(text).unwrap_or_else(|| fallback_summary(text))
    }

    fn mode(&self) -> SummarizerMode {
        SummarizerMode::Fallback
    }
}

/// Hosted abstractive summarizer (distilbart by default).
pub struct ModelSummarizer {
    client: InferenceClient,
    model: String,
    max_length: usize,
    min_length: usize,
}

impl ModelSummarizer {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        if !config.backends_enabled() {
            return Err(Error::Unavailable(
                "no inference endpoint or API token configured".into(),
            ));
        }
        Ok(Self {
            client: InferenceClient::new(config)?,
            model: config.summarization_model.clone(),
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn call_model(&self, cleaned: &str) -> Result<String> {
        let body = json!({
            "inputs": cleaned,
            "parameters": {
                "max_length": self.max_length,
                "min_length": self.min_length,
                "do_sample": false,
                "truncation": "only_first",
            },
            "options": { "wait_for_model": true },
        });
        let response = self.client.post_json(&self.model, &body).await?;
        let summary = response[0]["summary_text"]
            .as_str()
            .or_else(|| response["summary_text"].as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Inference("response has no summary_text".into()))?;

        // Generation lengths are in tokens; keep the word bound regardless.
        let words: Vec<&str> = summary.split_whitespace().collect();
        if words.len() > self.max_length {
            Ok(words[..self.max_length].join(" "))
        } else {
            Ok(summary.to_string())
        }
    }
}

#[async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(&self, text: &str) -> String {
        if let Some(short) = pass_through(text) {
            return short;
        }
        let cleaned = clean_text(text);
        match self.call_model(&cleaned).await {
            Ok(summary) => {
                debug!("Summarized {} words into {}", word_count(&cleaned), word_count(&summary));
                summary
            }
            Err(e) => {
                warn!("Summarization error: {}. Using truncation fallback.", e);
                fallback_summary(text)
            }
        }
    }

    fn mode(&self) -> SummarizerMode {
        SummarizerMode::Model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (1..=n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  My   grandfather\n\nwas\tborn  "), "My grandfather was born");
    }

    #[test]
    fn test_clean_text_bounds_length() {
        let long = "a".repeat(1500);
        let cleaned = clean_text(&long);
        assert_eq!(cleaned.len(), MAX_INPUT_CHARS + 3);
        assert!(cleaned.ends_with("..."));

        let exact = "b".repeat(MAX_INPUT_CHARS);
        assert_eq!(clean_text(&exact), exact);
    }

    #[test]
    fn test_fallback_summary() {
        let long = words(80);
        let summary = fallback_summary(&long);
        assert!(summary.ends_with("w50..."));
        assert_eq!(summary.split_whitespace().count(), 50);

        let exactly_fifty = words(50);
        assert_eq!(fallback_summary(&exactly_fifty), exactly_fifty);
    }

    #[tokio::test]
    async fn test_short_text_passes_through() {
        let text = "  We moved   to Canada in 1962. ";
        let summary = FallbackSummarizer.summarize(text).await;
        assert_eq!(summary, clean_text(text));
        assert_eq!(summary, "We moved to Canada in 1962.");
    }

    #[tokio::test]
    async fn test_fallback_mode_truncates() {
        let summary = FallbackSummarizer.summarize(&words(60)).await;
        assert!(summary.ends_with("..."));
        assert_eq!(FallbackSummarizer.mode(), SummarizerMode::Fallback);
        assert!(!FallbackSummarizer.is_available());
    }

    #[tokio::test]
    async fn test_fallback_is_deterministic() {
        let text = words(120);
        assert_eq!(
            FallbackSummarizer.summarize(&text).await,
            FallbackSummarizer.summarize(&text).await
        );
    }

    #[test]
    fn test_model_summarizer_requires_configuration() {
        let config = ModelConfig::default();
        assert!(matches!(ModelSummarizer::load(&config), Err(Error::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_model_error_falls_back_to_truncation() {
        // Nothing listens on the discard port; the request fails immediately.
        let config = ModelConfig {
            inference_url: Some("http://127.0.0.1:9".into()),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let summarizer = ModelSummarizer::load(&config).unwrap();
        assert!(summarizer.is_available());

        let text = words(70);
        assert_eq!(summarizer.summarize(&text).await, fallback_summary(&text));
        assert_eq!(summarizer.summarize("Short story.").await, "Short story.");
    }
}
