//! Story illustration: keyword-derived prompt plus an optional image model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::client::{BinaryOutput, InferenceClient};
use legacytree_core::{Error, ModelConfig, Result};

pub const DEFAULT_STYLE: &str = "realistic";

const STYLE_MODIFIERS: &[(&str, &str)] = &[
    ("realistic", "photorealistic, detailed, high quality"),
    ("artistic", "artistic, painterly, beautiful composition"),
    ("vintage", "vintage, nostalgic, sepia tones"),
    ("modern", "modern, clean, minimalist"),
    ("fantasy", "fantastical, magical, dreamlike"),
];

const UNKNOWN_STYLE_MODIFIER: &str = "realistic, detailed";

/// Keyword group → scene phrase, in prompt order.
const SCENES: &[(&[&str], &str)] = &[
    (&["war", "soldier", "military"], "historical, wartime scene"),
    (&["love", "romance", "marriage"], "romantic, emotional scene"),
    (&["family", "grandfather", "grandmother"], "family, generational scene"),
    (&["migration", "journey", "travel"], "journey, travel scene"),
    (&["school", "education"], "educational, learning scene"),
    (&["work", "job", "career"], "professional, working scene"),
];

const GENERIC_SCENE: &str = "a meaningful life moment";
const EXCERPT_CHARS: usize = 100;

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Serialize)]
pub struct RenderParams {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            num_inference_steps: 20,
            guidance_scale: 7.5,
            width: 512,
            height: 512,
        }
    }
}

/// Text-to-image backend.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn render(&self, prompt: &str, params: &RenderParams) -> Result<BinaryOutput>;
}

/// Hosted diffusion model (SDXL by default).
pub struct HostedImageModel {
    client: InferenceClient,
    model: String,
}

impl HostedImageModel {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        if !config.backends_enabled() {
            return Err(Error::Unavailable(
                "no inference endpoint or API token configured".into(),
            ));
        }
        Ok(Self {
            client: InferenceClient::new(config)?,
            model: config.illustration_model.clone(),
        })
    }
}

#[async_trait]
impl ImageModel for HostedImageModel {
    async fn render(&self, prompt: &str, params: &RenderParams) -> Result<BinaryOutput> {
        let body = json!({
            "inputs": prompt,
            "parameters": params,
            "options": { "wait_for_model": true },
        });
        let output = self.client.post_json_for_bytes(&self.model, &body).await?;
        if !output.mime.starts_with("image/") {
            return Err(Error::Inference(format!("Unexpected image type {}", output.mime)));
        }
        Ok(output)
    }
}

/// A generated illustration.
#[derive(Debug, Clone, Serialize)]
pub struct Illustration {
    /// Inline `data:image/...;base64,` URI.
    pub data_uri: String,
    pub prompt: String,
}

/// Generates story illustrations when an image model is loaded.
pub struct IllustrationGenerator {
    model: Option<Arc<dyn ImageModel>>,
    params: RenderParams,
}

impl IllustrationGenerator {
    pub fn new(model: Arc<dyn ImageModel>) -> Self {
        Self {
            model: Some(model),
            params: RenderParams::default(),
        }
    }

    /// Generator with no backend; every request yields no illustration.
    pub fn unavailable() -> Self {
        Self {
            model: None,
            params: RenderParams::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Generate an illustration. `None` when unavailable or on any failure.
    pub async fn generate(&self, text: &str, style: &str) -> Option<Illustration> {
        let model = self.model.as_ref()?;
        let prompt = build_prompt(text, style);
        info!("Generating illustration with prompt: {}", prompt);

        match model.render(&prompt, &self.params).await {
            Ok(image) => Some(Illustration {
                data_uri: image.to_data_uri(),
                prompt,
            }),
            Err(e) => {
                warn!("Error generating illustration: {}", e);
                None
            }
        }
    }
}

/// Style modifier for a style hint; unknown hints get a neutral realistic modifier.
pub fn style_modifier(style: &str) -> &'static str {
    let wanted = style.trim().to_lowercase();
    STYLE_MODIFIERS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, modifier)| *modifier)
        .unwrap_or(UNKNOWN_STYLE_MODIFIER)
}

/// Build the image prompt from story keywords, a style modifier and an excerpt.
pub fn build_prompt(text: &str, style: &str) -> String {
    let lower = text.to_lowercase();
    let scenes: Vec<&str> = SCENES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, scene)| *scene)
        .collect();

    let depiction = if scenes.is_empty() {
        GENERIC_SCENE.to_string()
    } else {
        scenes.join(", ")
    };
    let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();

    format!(
        "A {} illustration depicting {}. {}..., high quality, detailed, emotional, meaningful",
        style_modifier(style),
        depiction,
        excerpt
    )
}
