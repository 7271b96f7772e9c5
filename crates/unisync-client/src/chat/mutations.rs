use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use unisync_shared::constants::NEW_CONVERSATION_TITLE;
use unisync_shared::models::{Conversation, Message, Role};
use unisync_shared::protocol::SendMessageResponse;
use unisync_shared::text::{preview_from, title_from};
use unisync_shared::types::{ConversationId, CorrelationId};

use super::controller::ChatState;
use super::{conversations_key, messages_key};
use crate::error::ClientError;
use crate::events::ChatEvent;
use crate::mutation::MutationHooks;

// ---------------------------------------------------------------------------
// Create conversation
// ---------------------------------------------------------------------------

pub(crate) struct CreateConversationHooks<'a> {
    pub(crate) state: &'a ChatState,
}

impl MutationHooks<(), Conversation> for CreateConversationHooks<'_> {
    type Context = ();

    fn on_mutate(&self, _vars: &()) {}

    fn on_success(&self, conversation: &Conversation, _vars: &(), _ctx: ()) {
        let id = conversation.id.clone();

        self.state.conversations.update_data(&conversations_key(), |list| {
            list.retain(|c| c.id != id);
            list.insert(0, conversation.clone());
        });
        // The server may not have listed it yet; refetch on next refresh.
        self.state.conversations.invalidate(&conversations_key());

        // Seed the message cache so the new id is usable as a key right away.
        self.state.messages.set_data(&messages_key(&id), Vec::new());
        self.state.set_active(Some(id.clone()));

        self.state.events.emit(ChatEvent::ConversationCreated {
            conversation: id.clone(),
        });
        self.state.events.emit(ChatEvent::ConversationSelected {
            conversation: Some(id),
        });
    }

    fn on_error(&self, error: &ClientError, _vars: &(), _ctx: ()) {
        warn!(error = %error, "Failed to create conversation");
    }
}

// ---------------------------------------------------------------------------
// Send message
// ---------------------------------------------------------------------------

/// One submission: which conversation, what text, and the correlation id
/// tying the optimistic entry to the eventual reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SendVars {
    pub conversation: ConversationId,
    pub content: String,
    pub correlation: CorrelationId,
    pub submitted_at: DateTime<Utc>,
}

impl SendVars {
    pub fn new(conversation: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation,
            content: content.into(),
            correlation: CorrelationId::new(),
            submitted_at: Utc::now(),
        }
    }
}

pub(crate) struct SendContext {
    first_exchange: bool,
    /// The history was never loaded, so the cache holds only what this send
    /// added and must be refetched before it is trusted.
    partial: bool,
}

/// A conversation without any exchange yet. Decided from the list entry,
/// which the server keeps authoritative, and only from the message cache
/// when the list does not know the conversation.
fn is_first_exchange(state: &ChatState, id: &ConversationId) -> bool {
    let listed = state
        .conversations
        .get_data(&conversations_key())
        .and_then(|list| list.into_iter().find(|c| &c.id == id));
    match listed {
        Some(conv) => conv.message_ids.is_empty() && conv.title == NEW_CONVERSATION_TITLE,
        None => state
            .messages
            .get_data(&messages_key(id))
            .is_some_and(|messages| messages.is_empty()),
    }
}

pub(crate) struct SendMessageHooks<'a> {
    pub(crate) state: &'a ChatState,
}

impl MutationHooks<SendVars, SendMessageResponse> for SendMessageHooks<'_> {
    type Context = SendContext;

    fn on_mutate(&self, vars: &SendVars) -> SendContext {
        let key = messages_key(&vars.conversation);
        // A fetch landing now would overwrite the optimistic entry.
        self.state.messages.cancel(&key);

        let first_exchange = is_first_exchange(self.state, &vars.conversation);
        let partial = self.state.messages.get_data(&key).is_none();

        let message_id = vars.correlation.user_message_id();
        let message = Message::user(message_id.clone(), vars.content.clone(), vars.submitted_at);
        self.state.messages.update_data(&key, |messages| messages.push(message));
        if partial {
            self.state.messages.invalidate(&key);
        }
        self.state.begin_send(&vars.conversation);

        debug!(
            conversation = %vars.conversation,
            correlation = %vars.correlation,
            "Optimistic message appended"
        );
        self.state.events.emit(ChatEvent::MessageAppended {
            conversation: vars.conversation.clone(),
            message: message_id,
            role: Role::User,
        });

        SendContext {
            first_exchange,
            partial,
        }
    }

    fn on_success(&self, response: &SendMessageResponse, vars: &SendVars, ctx: SendContext) {
        self.state.finish_send(&vars.conversation);
        if self.state.is_deleted(&vars.conversation) {
            debug!(
                conversation = %vars.conversation,
                correlation = %vars.correlation,
                "Reply for deleted conversation discarded"
            );
            return;
        }

        let now = Utc::now();
        let reply_id = vars.correlation.assistant_message_id();
        let reply = Message::assistant(reply_id.clone(), response.assistant.clone(), now);
        let key = messages_key(&vars.conversation);
        self.state.messages.update_data(&key, |messages| messages.push(reply));
        if ctx.partial {
            self.state.messages.invalidate(&key);
        }

        self.state
            .conversations
            .update_existing(&conversations_key(), |list| {
                if let Some(conv) = list.iter_mut().find(|c| c.id == vars.conversation) {
                    // A concurrent send may have completed the first exchange.
                    if ctx.first_exchange && conv.message_ids.is_empty() {
                        conv.title = title_from(&vars.content);
                    }
                    conv.record_exchange(preview_from(&response.assistant), now);
                    conv.message_ids.push(vars.correlation.user_message_id());
                    conv.message_ids.push(reply_id.clone());
                }
            });
        self.state.conversations.invalidate(&conversations_key());

        info!(
            conversation = %vars.conversation,
            correlation = %vars.correlation,
            "Reply received"
        );
        self.state.events.emit(ChatEvent::MessageAppended {
            conversation: vars.conversation.clone(),
            message: reply_id,
            role: Role::Assistant,
        });
    }

    fn on_error(&self, error: &ClientError, vars: &SendVars, ctx: SendContext) {
        self.state.finish_send(&vars.conversation);
        if self.state.is_deleted(&vars.conversation) {
            return;
        }

        let optimistic = vars.correlation.user_message_id();
        let key = messages_key(&vars.conversation);
        self.state
            .messages
            .update_existing(&key, |messages| messages.retain(|m| m.id != optimistic));
        if ctx.partial {
            self.state.messages.invalidate(&key);
        }
        self.state.mark_reverted(&vars.conversation);

        warn!(
            conversation = %vars.conversation,
            correlation = %vars.correlation,
            error = %error,
            "Send failed, optimistic message rolled back"
        );
        self.state.events.emit(ChatEvent::SendFailed {
            conversation: vars.conversation.clone(),
            correlation: vars.correlation,
            error: error.to_string(),
        });
    }
}
