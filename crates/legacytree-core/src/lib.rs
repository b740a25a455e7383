//! LegacyTree Core: configuration, errors and the story vocabulary.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod types;

pub use capabilities::{BackendStatus, SummarizerMode};
pub use config::{ChatConfig, DataPaths, GeocoderConfig, LegacyTreeConfig, ModelConfig};
pub use error::{Error, Result};
pub use types::{Theme, Visibility};
