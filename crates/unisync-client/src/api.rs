//! The chat backend as seen by the synchronization core.

use async_trait::async_trait;
use tracing::info;

use unisync_shared::constants::CONVERSATIONS_PATH;
use unisync_shared::models::{Conversation, Message};
use unisync_shared::protocol::{DeleteConversationResponse, SendMessageRequest, SendMessageResponse};
use unisync_shared::types::ConversationId;

use crate::error::ClientError;
use crate::transport::ApiClient;

/// Operations of the chat HTTP API.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError>;

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, ClientError>;

    async fn create_conversation(&self) -> Result<Conversation, ClientError>;

    async fn send_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<SendMessageResponse, ClientError>;

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ClientError>;
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.get(CONVERSATIONS_PATH).await
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, ClientError> {
        let messages: Vec<Message> = self.get(&id.messages_path()).await?;
        Ok(messages.into_iter().map(Message::normalized).collect())
    }

    async fn create_conversation(&self) -> Result<Conversation, ClientError> {
        let conversation: Conversation = self.post::<_, ()>(CONVERSATIONS_PATH, None).await?;
        info!(conversation = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    async fn send_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<SendMessageResponse, ClientError> {
        let body = SendMessageRequest {
            content: content.to_string(),
        };
        self.post(&id.messages_path(), Some(&body)).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ClientError> {
        let _: DeleteConversationResponse = self.delete(&id.path()).await?;
        Ok(())
    }
}
