//! Conversation types for the guided story interview API.

use serde::{Deserialize, Serialize};

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A guided interview with its ordered turns.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSession {
    pub id: String,
    pub turns: Vec<Turn>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Stateless conversation request: the full history, oldest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRequest {
    pub history: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub response: String,
}

/// Message sent within a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionMessageRequest {
    pub message: String,
}

/// Reply plus the session as it stands after the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMessageResponse {
    pub response: String,
    pub session: ConversationSession,
}
