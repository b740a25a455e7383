//! LegacyTree Chat: guided story interview over a conversation model.

pub mod model;
pub mod session;
pub mod types;

pub use model::{
    build_conversation_input, create_conversation_model, ConversationModel,
    HostedConversationModel, NoopConversationModel,
};
pub use session::SessionManager;
pub use types::*;

/// Prepended to every session's history; never stored as a turn.
pub const GUIDE_SYSTEM_PROMPT: &str = "You are a helpful AI that interviews people to record \
their life stories. Ask thoughtful, open-ended questions to help them share their memories.";
