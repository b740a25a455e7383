//! Story vocabulary shared by the store, the enrichment pipeline and the API.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Categorical label describing a story's subject matter.
///
/// Variant order is significant: theme scoring breaks ties in favour of the
/// earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Love,
    War,
    Migration,
    #[default]
    Family,
    Tradition,
    Adventure,
    Struggle,
    Success,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[
            Self::Love,
            Self::War,
            Self::Migration,
            Self::Family,
            Self::Tradition,
            Self::Adventure,
            Self::Struggle,
            Self::Success,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::War => "war",
            Self::Migration => "migration",
            Self::Family => "family",
            Self::Tradition => "tradition",
            Self::Adventure => "adventure",
            Self::Struggle => "struggle",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Theme::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("Unknown theme: {}", s)))
    }
}

/// Who may see a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(alias = "private", alias = "Private (Family Only)")]
    Private,
    #[default]
    #[serde(alias = "public")]
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Public => "Public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "public" {
            Ok(Self::Public)
        } else if lower.starts_with("private") {
            Ok(Self::Private)
        } else {
            Err(Error::Validation(format!("Unknown visibility: {}", s)))
        }
    }
}
