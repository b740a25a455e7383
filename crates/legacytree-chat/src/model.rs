//! Conversation model backends.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use legacytree_core::{Error, ModelConfig, Result};
use legacytree_infer::InferenceClient;

/// Turn separator expected by BlenderBot-style models.
pub const TURN_SEPARATOR: &str = " </s> ";
pub const MAX_REPLY_LENGTH: usize = 128;

/// Produces the next reply for a conversation history.
#[async_trait]
pub trait ConversationModel: Send + Sync {
    /// History is oldest first and may start with a system prompt.
    async fn reply(&self, history: &[String]) -> Result<String>;

    fn is_available(&self) -> bool;
}

/// Join turns into the single input string BlenderBot expects.
pub fn build_conversation_input(history: &[String]) -> String {
    history.join(TURN_SEPARATOR)
}

/// Hosted BlenderBot.
pub struct HostedConversationModel {
    client: InferenceClient,
    model: String,
}

impl HostedConversationModel {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        if !config.backends_enabled() {
            return Err(Error::Unavailable(
                "no inference endpoint or API token configured".into(),
            ));
        }
        Ok(Self {
            client: InferenceClient::new(config)?,
            model: config.conversation_model.clone(),
        })
    }
}

#[async_trait]
impl ConversationModel for HostedConversationModel {
    async fn reply(&self, history: &[String]) -> Result<String> {
        if history.is_empty() {
            return Err(Error::Validation("Conversation history is empty".into()));
        }
        let body = json!({
            "inputs": build_conversation_input(history),
            "parameters": { "max_length": MAX_REPLY_LENGTH },
            "options": { "wait_for_model": true },
        });
        let response = self
            .client
            .post_json(&self.model, &body)
            .await
            .map_err(|e| Error::Unavailable(format!("Conversation model failed: {}", e)))?;

        let reply = response[0]["generated_text"]
            .as_str()
            .or_else(|| response["generated_text"].as_str())
            .map(str::trim)
            .ok_or_else(|| Error::Unavailable("Conversation model returned no text".into()))?;
        debug!("Conversation reply: {} chars", reply.len());
        Ok(reply.to_string())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Used when no conversation model is configured.
pub struct NoopConversationModel;

#[async_trait]
impl ConversationModel for NoopConversationModel {
    async fn reply(&self, _history: &[String]) -> Result<String> {
        Err(Error::Unavailable("Conversation model is not loaded".into()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Create the conversation model, `NoopConversationModel` if none can be used.
pub fn create_conversation_model(config: &ModelConfig) -> Arc<dyn ConversationModel> {
    match HostedConversationModel::load(config) {
        Ok(model) => {
            info!("Conversation model configured: {}", config.conversation_model);
            Arc::new(model)
        }
        Err(e) => {
            warn!("Conversation model unavailable: {}", e);
            Arc::new(NoopConversationModel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_conversation_input() {
        let history = vec![
            "You are a helpful AI.".to_string(),
            "Hello".to_string(),
            "Hi! Tell me about your family.".to_string(),
        ];
        assert_eq!(
            build_conversation_input(&history),
            "You are a helpful AI. </s> Hello </s> Hi! Tell me about your family."
        );
        assert_eq!(build_conversation_input(&["only".to_string()]), "only");
    }

    #[tokio::test]
    async fn test_noop_model_is_unavailable() {
        let model = create_conversation_model(&ModelConfig::default());
        assert!(!model.is_available());
        let err = model.reply(&["Hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_model_is_unavailable() {
        let config = ModelConfig {
            inference_url: Some("http://127.0.0.1:9".into()),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let model = create_conversation_model(&config);
        assert!(model.is_available());
        let err = model.reply(&["Hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(matches!(model.reply(&[]).await, Err(Error::Validation(_))));
    }
}
