//! Conversation sessions with bounded history.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::model::ConversationModel;
use crate::types::{ConversationSession, Turn};
use crate::GUIDE_SYSTEM_PROMPT;
use legacytree_core::{ChatConfig, Error, Result};

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, ConversationSession>,
    /// Session ids, oldest first.
    order: VecDeque<String>,
}

/// Owns the interview sessions and sends their history to the model.
pub struct SessionManager {
    model: Arc<dyn ConversationModel>,
    sessions: RwLock<Sessions>,
    system_prompt: String,
    max_turns: Option<usize>,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(model: Arc<dyn ConversationModel>, config: &ChatConfig) -> Self {
        Self {
            model,
            sessions: RwLock::new(Sessions::default()),
            system_prompt: GUIDE_SYSTEM_PROMPT.to_string(),
            max_turns: config.max_turns,
            max_sessions: config.max_sessions.max(1),
        }
    }

    pub fn model(&self) -> &Arc<dyn ConversationModel> {
        &self.model
    }

    pub fn is_available(&self) -> bool {
        self.model.is_available()
    }

    /// Stateless exchange: the caller supplies the whole history.
    pub async fn reply(&self, history: &[String]) -> Result<String> {
        if history.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::Validation("Conversation history is empty".into()));
        }
        self.model.reply(history).await
    }

    /// Start an empty session. The oldest session is evicted at capacity.
    pub fn create(&self) -> ConversationSession {
        let now = chrono::Utc::now().to_rfc3339();
        let session = ConversationSession {
            id: uuid::Uuid::new_v4().to_string(),
            turns: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let mut sessions = self.sessions.write();
        while sessions.by_id.len() >= self.max_sessions {
            match sessions.order.pop_front() {
                Some(oldest) => {
                    sessions.by_id.remove(&oldest);
                    debug!("Evicted conversation session {}", oldest);
                }
                None => break,
            }
        }
        sessions.order.push_back(session.id.clone());
        sessions.by_id.insert(session.id.clone(), session.clone());
        info!("Conversation session created: {}", session.id);
        session
    }

    pub fn get(&self, id: &str) -> Result<ConversationSession> {
        self.sessions
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// All sessions, oldest first.
    pub fn list(&self) -> Vec<ConversationSession> {
        let sessions = self.sessions.read();
        sessions
            .order
            .iter()
            .filter_map(|id| sessions.by_id.get(id).cloned())
            .collect()
    }

    /// Clear a session's turns, keeping its id.
    pub fn reset(&self, id: &str) -> Result<ConversationSession> {
        let mut sessions = self.sessions.write();
        let session = sessions.by_id.get_mut(id).ok_or_else(|| not_found(id))?;
        session.turns.clear();
        session.updated_at = chrono::Utc::now().to_rfc3339();
        info!("Conversation session reset: {}", id);
        Ok(session.clone())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        if sessions.by_id.remove(id).is_none() {
            return Err(not_found(id));
        }
        sessions.order.retain(|s| s != id);
        info!("Conversation session deleted: {}", id);
        Ok(())
    }

    /// Send a message within a session.
    ///
    /// The model sees the guide prompt, the session's turns and the new
    /// message. The user turn and the reply are recorded together only when
    /// the model answers; on failure the session is unchanged.
    pub async fn converse(&self, id: &str, message: &str) -> Result<(String, ConversationSession)> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Validation("Message cannot be empty".into()));
        }

        let history = {
            let sessions = self.sessions.read();
            let session = sessions.by_id.get(id).ok_or_else(|| not_found(id))?;
            let mut history = Vec::with_capacity(session.turns.len() + 2);
            history.push(self.system_prompt.clone());
            history.extend(session.turns.iter().map(|t| t.content.clone()));
            history.push(message.to_string());
            history
        };

        let reply = self.model.reply(&history).await?;

        let mut sessions = self.sessions.write();
        // The session may have been deleted while the model was answering.
        let session = sessions.by_id.get_mut(id).ok_or_else(|| not_found(id))?;
        session.turns.push(Turn::user(message));
        session.turns.push(Turn::assistant(reply.clone()));
        if let Some(max) = self.max_turns {
            while session.turns.len() > max.max(2) {
                session.turns.drain(..2);
            }
        }
        session.updated_at = chrono::Utc::now().to_rfc3339();
        Ok((reply, session.clone()))
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("conversation session {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoopConversationModel;
    use crate::types::Role;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Replies "reply N" and records every history it was sent.
    #[derive(Default)]
    struct EchoModel {
        seen: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl ConversationModel for EchoModel {
        async fn reply(&self, history: &[String]) -> Result<String> {
            let mut seen = self.seen.lock();
            seen.push(history.to_vec());
            Ok(format!("reply {}", seen.len()))
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn manager(max_turns: Option<usize>, max_sessions: usize) -> (SessionManager, Arc<EchoModel>) {
        let model = Arc::new(EchoModel::default());
        let config = ChatConfig {
            max_turns,
            max_sessions,
        };
        (SessionManager::new(model.clone(), &config), model)
    }

    #[tokio::test]
    async fn test_converse_sends_prompt_and_history() {
        let (chat, model) = manager(None, 10);
        let session = chat.create();

        let (first, _) = chat.converse(&session.id, "Hello").await.unwrap();
        assert_eq!(first, "reply 1");
        let (_, after) = chat.converse(&session.id, "I grew up in Mumbai").await.unwrap();

        let seen = model.seen.lock();
        assert_eq!(seen[0], vec![GUIDE_SYSTEM_PROMPT.to_string(), "Hello".to_string()]);
        assert_eq!(
            seen[1],
            vec![
                GUIDE_SYSTEM_PROMPT.to_string(),
                "Hello".to_string(),
                "reply 1".to_string(),
                "I grew up in Mumbai".to_string(),
            ]
        );
        assert_eq!(after.turns.len(), 4);
        assert_eq!(after.turns[0].role, Role::User);
        assert_eq!(after.turns[3], Turn::assistant("reply 2"));
    }

    #[tokio::test]
    async fn test_max_turns_evicts_oldest_pair() {
        let (chat, _) = manager(Some(4), 10);
        let id = chat.create().id;
        for msg in ["one", "two", "three"] {
            chat.converse(&id, msg).await.unwrap();
        }
        let session = chat.get(&id).unwrap();
        let contents: Vec<&str> = session.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "reply 2", "three", "reply 3"]);
    }

    #[tokio::test]
    async fn test_failure_leaves_session_unchanged() {
        let chat = SessionManager::new(Arc::new(NoopConversationModel), &ChatConfig::default());
        assert!(!chat.is_available());
        let id = chat.create().id;

        let err = chat.converse(&id, "Hello").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(chat.get(&id).unwrap().turns.is_empty());
    }

    #[tokio::test]
    async fn test_reset_and_delete() {
        let (chat, _) = manager(None, 10);
        let id = chat.create().id;
        chat.converse(&id, "Hello").await.unwrap();

        let reset = chat.reset(&id).unwrap();
        assert_eq!(reset.id, id);
        assert!(reset.turns.is_empty());

        chat.delete(&id).unwrap();
        assert!(matches!(chat.get(&id), Err(Error::NotFound(_))));
        assert!(matches!(chat.delete(&id), Err(Error::NotFound(_))));
        assert!(matches!(
            chat.converse(&id, "Hello").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let (chat, model) = manager(None, 10);
        let id = chat.create().id;
        assert!(matches!(chat.converse(&id, "  ").await, Err(Error::Validation(_))));
        assert!(matches!(chat.reply(&[]).await, Err(Error::Validation(_))));
        assert!(model.seen.lock().is_empty());

        let reply = chat.reply(&["Hi".to_string()]).await.unwrap();
        assert_eq!(reply, "reply 1");
    }

    #[test]
    fn test_oldest_session_evicted_at_capacity() {
        let (chat, _) = manager(None, 2);
        let a = chat.create().id;
        let b = chat.create().id;
        let c = chat.create().id;

        assert!(matches!(chat.get(&a), Err(Error::NotFound(_))));
        let ids: Vec<String> = chat.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, c]);
    }
}
