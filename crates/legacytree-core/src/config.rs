//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const DEFAULT_CONVERSATION_MODEL: &str = "facebook/blenderbot-400M-distill";
pub const DEFAULT_ILLUSTRATION_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "openai/whisper-base";
pub const DEFAULT_SYNTHESIS_MODEL: &str = "facebook/mms-tts-eng";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "legacytree_app";

/// Paths to all LegacyTree data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
    /// Uploaded audio and photo artifacts (`data/uploads/`).
    pub uploads: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            uploads: root.join("uploads"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.db)?;
        std::fs::create_dir_all(&self.uploads)?;
        Ok(())
    }
}

/// Settings for the hosted inference backends (summary, image, speech, chat).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// When false every backend runs in lightweight (fallback) mode.
    pub use_ai_model: bool,
    /// Explicit inference endpoint. `None` means the public default.
    pub inference_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub summarization_model: String,
    pub conversation_model: String,
    pub illustration_model: String,
    pub transcription_model: String,
    pub synthesis_model: String,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            use_ai_model: true,
            inference_url: None,
            api_token: None,
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.into(),
            conversation_model: DEFAULT_CONVERSATION_MODEL.into(),
            illustration_model: DEFAULT_ILLUSTRATION_MODEL.into(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.into(),
            synthesis_model: DEFAULT_SYNTHESIS_MODEL.into(),
            request_timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    /// Model backends are only built when AI mode is on and there is somewhere
    /// to send requests: a self-hosted endpoint or a token for the public one.
    pub fn backends_enabled(&self) -> bool {
        self.use_ai_model && (self.inference_url.is_some() || self.api_token.is_some())
    }

    /// Base URL that model names are appended to.
    pub fn endpoint(&self) -> &str {
        self.inference_url
            .as_deref()
            .unwrap_or(DEFAULT_INFERENCE_URL)
    }
}

/// Settings for the location lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Courtesy delay before each external lookup.
    pub delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.into(),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.into(),
            delay_ms: 1000,
            timeout_secs: 10,
        }
    }
}

/// Conversation session limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Oldest exchanges are evicted beyond this many turns. `None` keeps all.
    pub max_turns: Option<usize>,
    pub max_sessions: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_turns: Some(40),
            max_sessions: 100,
        }
    }
}

/// Top-level LegacyTree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyTreeConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    pub models: ModelConfig,
    pub geocoder: GeocoderConfig,
    pub chat: ChatConfig,
}

impl LegacyTreeConfig {
    /// Configuration with defaults, rooted at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            port: DEFAULT_PORT,
            data_paths: DataPaths::new(data_dir)?,
            models: ModelConfig::default(),
            geocoder: GeocoderConfig::default(),
            chat: ChatConfig::default(),
        })
    }

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut config = Self::new(data_dir)?;

        if let Some(port) = env_parse("PORT") {
            config.port = port;
        }

        let models = &mut config.models;
        if let Some(flag) = env_flag("LEGACYTREE_USE_AI_MODEL") {
            models.use_ai_model = flag;
        }
        models.inference_url = env_string("LEGACYTREE_INFERENCE_URL");
        models.api_token = env_string("HF_API_TOKEN");
        if let Some(m) = env_string("LEGACYTREE_SUMMARIZATION_MODEL") {
            models.summarization_model = m;
        }
        if let Some(m) = env_string("LEGACYTREE_CONVERSATION_MODEL") {
            models.conversation_model = m;
        }
        if let Some(m) = env_string("LEGACYTREE_ILLUSTRATION_MODEL") {
            models.illustration_model = m;
        }
        if let Some(m) = env_string("LEGACYTREE_TRANSCRIPTION_MODEL") {
            models.transcription_model = m;
        }
        if let Some(m) = env_string("LEGACYTREE_SYNTHESIS_MODEL") {
            models.synthesis_model = m;
        }
        if let Some(t) = env_parse("LEGACYTREE_MODEL_TIMEOUT_SECS") {
            models.request_timeout_secs = t;
        }

        let geocoder = &mut config.geocoder;
        if let Some(url) = env_string("LEGACYTREE_GEOCODER_URL") {
            geocoder.base_url = url;
        }
        if let Some(delay) = env_parse("LEGACYTREE_GEOCODER_DELAY_MS") {
            geocoder.delay_ms = delay;
        }
        if let Some(t) = env_parse("LEGACYTREE_GEOCODER_TIMEOUT_SECS") {
            geocoder.timeout_secs = t;
        }

        if let Some(turns) = env_parse::<usize>("LEGACYTREE_CHAT_MAX_TURNS") {
            // 0 disables eviction
            config.chat.max_turns = (turns > 0).then_some(turns);
        }

        Ok(config)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env_string(key).map(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
