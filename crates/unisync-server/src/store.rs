//! In-memory conversation store of the development server.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use unisync_shared::models::{Conversation, Message};
use unisync_shared::text::{preview_from, title_from};
use unisync_shared::types::{ConversationId, MessageId};

use crate::error::ServerError;
use crate::mock;

#[derive(Default)]
struct Inner {
    /// Newest first.
    conversations: Vec<Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
    next_id: u64,
}

impl Inner {
    fn conversation_mut(&mut self, id: &ConversationId) -> Result<&mut Conversation, ServerError> {
        self.conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ServerError::ConversationNotFound(id.clone()))
    }
}

#[derive(Default)]
pub struct ChatStore {
    inner: RwLock<Inner>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample conversations.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let mut inner = Inner::default();
        for seed in &mock::SEED {
            let at = now - Duration::minutes(seed.age_minutes);
            let id = ConversationId::from(seed.id);
            let messages = vec![
                Message::user(MessageId(format!("{}-1", seed.id)), seed.question, at),
                Message::assistant(MessageId(format!("{}-2", seed.id)), seed.answer, at),
            ];
            inner.conversations.push(Conversation {
                title: seed.title.to_string(),
                last_message: preview_from(seed.answer),
                message_ids: messages.iter().map(|m| m.id.clone()).collect(),
                ..Conversation::new(id.clone(), at)
            });
            inner.messages.insert(id, messages);
        }
        inner.next_id = mock::SEED.len() as u64;
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub async fn list(&self) -> Vec<Conversation> {
        self.inner.read().await.conversations.clone()
    }

    pub async fn create(&self) -> Conversation {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = ConversationId(inner.next_id.to_string());
        let conversation = Conversation::new(id.clone(), Utc::now());
        inner.conversations.insert(0, conversation.clone());
        inner.messages.insert(id.clone(), Vec::new());
        info!(conversation = %id, "Conversation created");
        conversation
    }

    pub async fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, ServerError> {
        self.inner
            .read()
            .await
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| ServerError::ConversationNotFound(id.clone()))
    }

    pub async fn contains(&self, id: &ConversationId) -> bool {
        self.inner.read().await.messages.contains_key(id)
    }

    /// Append a user message and the assistant's reply, then update the
    /// conversation's title (first exchange only), preview and timestamp.
    pub async fn record_exchange(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<Message, ServerError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let history = inner
            .messages
            .get_mut(id)
            .ok_or_else(|| ServerError::ConversationNotFound(id.clone()))?;
        let first_exchange = history.is_empty();
        let question = Message::user(MessageId::new(), content, now);
        let reply = mock::assistant_reply(MessageId::new(), now);
        history.push(question.clone());
        history.push(reply.clone());

        let conversation = inner.conversation_mut(id)?;
        if first_exchange {
            conversation.title = title_from(content);
        }
        conversation.record_exchange(preview_from(&reply.content), now);
        conversation.message_ids.push(question.id);
        conversation.message_ids.push(reply.id.clone());

        debug!(conversation = %id, first_exchange, "Exchange recorded");
        Ok(reply)
    }

    pub async fn delete(&self, id: &ConversationId) -> Result<(), ServerError> {
        let mut inner = self.inner.write().await;
        if inner.messages.remove(id).is_none() {
            return Err(ServerError::ConversationNotFound(id.clone()));
        }
        inner.conversations.retain(|c| &c.id != id);
        info!(conversation = %id, "Conversation deleted");
        Ok(())
    }
}
