use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::warn;

use unisync_shared::types::{ConversationId, MessageId};

use super::Navigation;
use crate::chat::{ChatController, SendOutcome};
use crate::components::chat_input::ChatInput;
use crate::components::message_bubble::MessageBubble;
use crate::components::sidebar::Sidebar;
use crate::components::suggested_prompts;
use crate::error::ClientError;

pub const TYPING_INDICATOR: &str = "UniSync is thinking...";
pub const EMPTY_STATE: &str = "Start a new conversation or select one from the sidebar.";

/// The chat screen: sidebar, message list, typing indicator and input.
pub struct ChatPage {
    chat: ChatController,
    pub sidebar: Sidebar,
    pub input: ChatInput,
    collapsed_sections: HashSet<(MessageId, usize)>,
}

impl ChatPage {
    pub fn new(chat: ChatController) -> Self {
        Self {
            chat,
            sidebar: Sidebar::new(),
            input: ChatInput::new(),
            collapsed_sections: HashSet::new(),
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.chat
    }

    /// Load the conversation list and send the message carried from Home,
    /// if any, into a fresh conversation.
    pub async fn mount(&mut self, nav: &mut Navigation) -> Result<Option<SendOutcome>, ClientError> {
        if let Err(e) = self.chat.refresh_conversations().await {
            warn!(error = %e, "Failed to load conversations");
        }
        let Some(message) = nav.take_initial_message() else {
            return Ok(None);
        };
        let conversation = self.chat.new_conversation().await?;
        self.chat.send_to(conversation.id, &message).await.map(Some)
    }

    /// Submit the input's draft. `Ok(None)` when there was nothing to send.
    pub async fn submit(&mut self) -> Result<Option<SendOutcome>, ClientError> {
        let Some(message) = self.input.submit() else {
            return Ok(None);
        };
        self.chat.submit(&message).await.map(Some)
    }

    pub async fn select(&mut self, id: ConversationId) -> Result<(), ClientError> {
        self.chat.select(Some(id)).await
    }

    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.chat.select(None).await
    }

    pub async fn delete(&mut self, id: &ConversationId) {
        self.chat.delete_conversation(id).await;
    }

    /// Flip a source section of a message open/closed.
    pub fn toggle_section(&mut self, message: MessageId, section: usize) {
        let key = (message, section);
        if !self.collapsed_sections.remove(&key) {
            self.collapsed_sections.insert(key);
        }
    }

    pub fn typing_indicator(&self) -> Option<&'static str> {
        self.chat.is_sending().then_some(TYPING_INDICATOR)
    }

    pub fn bubbles(&self) -> Vec<MessageBubble> {
        self.chat
            .visible_messages()
            .into_iter()
            .map(|message| {
                let id = message.id.clone();
                let mut bubble = MessageBubble::new(message);
                for i in 0..bubble.sections().len() {
                    if self.collapsed_sections.contains(&(id.clone(), i)) {
                        bubble.toggle_section(i);
                    }
                }
                bubble
            })
            .collect()
    }

    pub fn render(&mut self, now: DateTime<Utc>) -> String {
        self.input.set_disabled(self.chat.is_sending());

        let snapshot = self.chat.conversations_snapshot();
        let view = self.sidebar.view(
            snapshot.data.as_deref().unwrap_or_default(),
            self.chat.active().as_ref(),
            snapshot.is_loading(),
            now,
        );
        let mut out = String::from("Conversations\n");
        out.push_str(&self.sidebar.render(&view));
        out.push('\n');

        let bubbles = self.bubbles();
        if bubbles.is_empty() {
            let _ = writeln!(out, "{EMPTY_STATE}\n");
            out.push_str(&suggested_prompts::render());
        } else {
            for bubble in &bubbles {
                out.push_str(&bubble.render(now));
                out.push('\n');
            }
        }
        if let Some(indicator) = self.typing_indicator() {
            let _ = writeln!(out, "• • •  {indicator}");
        }
        out
    }
}
