//! HTTP client for hosted model inference.
//!
//! Speaks the Hugging Face Inference API shape: `POST {endpoint}/{model}` with
//! a JSON `{"inputs": ..., "parameters": ...}` body. Binary inputs travel base64-encoded.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use legacytree_core::{Error, ModelConfig, Result};

/// Raw binary model output (images, audio) with its MIME type.
#[derive(Debug, Clone)]
pub struct BinaryOutput {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl BinaryOutput {
    /// Encode as an inline `data:` URI.
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }
}

/// Shared inference client. Cheap to clone.
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl InferenceClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.endpoint, model)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => req.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("API error {}: {}", status, body)));
        }
        Ok(response)
    }

    /// JSON in, JSON out.
    pub async fn post_json(&self, model: &str, body: &Value) -> Result<Value> {
        let url = self.model_url(model);
        debug!("Inference request to {}", url);
        let response = self.send(self.http.post(&url).json(body)).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Inference(format!("Invalid response from {}: {}", model, e)))
    }

    /// JSON in, binary out (text-to-image, text-to-speech).
    pub async fn post_json_for_bytes(&self, model: &str, body: &Value) -> Result<BinaryOutput> {
        let url = self.model_url(model);
        debug!("Inference request to {}", url);
        let response = self.send(self.http.post(&url).json(body)).await?;
        read_binary(response).await
    }
}

async fn read_binary(response: Response) -> Result<BinaryOutput> {
    let mime = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if mime.starts_with("application/json") {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Inference(format!("Expected binary output, got: {}", body)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Http(format!("Stream read error: {}", e)))?;
    if bytes.is_empty() {
        return Err(Error::Inference("Empty binary output".into()));
    }
    Ok(BinaryOutput {
        bytes: bytes.to_vec(),
        mime,
    })
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_model_url_joins_endpoint() {
        let config = ModelConfig {
            inference_url: Some("http://localhost:8080/models/".into()),
            ..Default::default()
        };
        let client = InferenceClient::new(&config).unwrap();
        assert_eq!(
            client.model_url("sshleifer/distilbart-cnn-12-6"),
            "http://localhost:8080/models/sshleifer/distilbart-cnn-12-6"
        );
    }
}
