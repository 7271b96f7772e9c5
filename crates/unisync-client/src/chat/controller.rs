use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use unisync_shared::constants::MESSAGES_QUERY_KEY;
use unisync_shared::models::{Conversation, Message};
use unisync_shared::types::{ConversationId, CorrelationId};

use super::mutations::{CreateConversationHooks, SendMessageHooks, SendVars};
use super::{conversations_key, messages_key};
use crate::api::ChatApi;
use crate::error::ClientError;
use crate::events::{ChatEvent, EventBus};
use crate::mutation::{Mutation, MutationStatus};
use crate::query::{QueryCache, QueryKey, QueryOptions, QuerySnapshot, QueryStatus};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where a conversation stands from the point of view of the chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    /// Not the active conversation.
    Unselected,
    /// Active, first fetch of its messages in flight.
    Loading,
    /// Active with messages (possibly none) to show.
    Ready,
    /// An optimistic message is waiting for its reply.
    Sending,
    /// The last send failed and its optimistic message was removed.
    Reverted,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub conversation: ConversationId,
    pub correlation: CorrelationId,
    pub reply: String,
}

pub(crate) struct ChatState {
    pub(crate) api: Arc<dyn ChatApi>,
    pub(crate) conversations: QueryCache<Vec<Conversation>>,
    pub(crate) messages: QueryCache<Vec<Message>>,
    pub(crate) events: EventBus,
    options: QueryOptions,
    active: Mutex<Option<ConversationId>>,
    sending: Mutex<HashMap<ConversationId, usize>>,
    reverted: Mutex<HashSet<ConversationId>>,
    /// Conversations deleted locally. Replies and refetches for them are
    /// ignored even if the server still knows them.
    deleted: Mutex<HashSet<ConversationId>>,
}

impl ChatState {
    pub(crate) fn active(&self) -> Option<ConversationId> {
        lock(&self.active).clone()
    }

    pub(crate) fn set_active(&self, id: Option<ConversationId>) {
        *lock(&self.active) = id;
    }

    pub(crate) fn begin_send(&self, id: &ConversationId) {
        *lock(&self.sending).entry(id.clone()).or_default() += 1;
        lock(&self.reverted).remove(id);
    }

    pub(crate) fn finish_send(&self, id: &ConversationId) {
        let mut sending = lock(&self.sending);
        if let Some(count) = sending.get_mut(id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                sending.remove(id);
            }
        }
    }

    pub(crate) fn mark_reverted(&self, id: &ConversationId) {
        lock(&self.reverted).insert(id.clone());
    }

    pub(crate) fn is_deleted(&self, id: &ConversationId) -> bool {
        lock(&self.deleted).contains(id)
    }

    fn is_sending_in(&self, id: &ConversationId) -> bool {
        lock(&self.sending).contains_key(id)
    }
}

/// The synchronization core: conversation list, per-conversation message
/// history and the active-conversation pointer.
///
/// Cloning is cheap; clones share the same caches.
#[derive(Clone)]
pub struct ChatController {
    state: Arc<ChatState>,
    create: Mutation,
    send: Mutation,
}

impl ChatController {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self::with_options(api, QueryOptions::default())
    }

    pub fn with_options(api: Arc<dyn ChatApi>, options: QueryOptions) -> Self {
        Self {
            state: Arc::new(ChatState {
                api,
                conversations: QueryCache::new(),
                messages: QueryCache::new(),
                events: EventBus::new(),
                options,
                active: Mutex::new(None),
                sending: Mutex::new(HashMap::new()),
                reverted: Mutex::new(HashSet::new()),
                deleted: Mutex::new(HashSet::new()),
            }),
            create: Mutation::new(),
            send: Mutation::new(),
        }
    }

    pub fn events(&self) -> broadcast::Receiver<ChatEvent> {
        self.state.events.subscribe()
    }

    // -- Conversation list ---------------------------------------------------

    pub fn active(&self) -> Option<ConversationId> {
        self.state.active()
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.state
            .conversations
            .get_data(&conversations_key())
            .unwrap_or_default()
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<Conversation> {
        self.conversations().into_iter().find(|c| &c.id == id)
    }

    pub fn conversations_snapshot(&self) -> QuerySnapshot<Vec<Conversation>> {
        self.state.conversations.snapshot(&conversations_key())
    }

    pub fn watch_conversations(&self) -> watch::Receiver<QuerySnapshot<Vec<Conversation>>> {
        self.state.conversations.subscribe(&conversations_key())
    }

    /// Load the conversation list unless the cached one is still fresh.
    pub async fn refresh_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let state = Arc::clone(&self.state);
        let list = self
            .state
            .conversations
            .fetch(&conversations_key(), self.state.options, move || async move {
                let mut list = state.api.list_conversations().await?;
                {
                    let deleted = lock(&state.deleted);
                    list.retain(|c| !deleted.contains(&c.id));
                }
                Ok(list)
            })
            .await?
            .unwrap_or_default();

        debug!(count = list.len(), "Conversations loaded");
        self.state
            .events
            .emit(ChatEvent::ConversationsLoaded { count: list.len() });
        Ok(list)
    }

    // -- Selection -----------------------------------------------------------

    /// Make `id` the active conversation (or clear the selection) and load
    /// its messages. Cached messages of other conversations are kept.
    pub async fn select(&self, id: Option<ConversationId>) -> Result<(), ClientError> {
        if let Some(id) = &id {
            if self.state.is_deleted(id) {
                return Err(ClientError::server(404, "Conversation not found"));
            }
        }
        self.state.set_active(id.clone());
        debug!(conversation = ?id, "Conversation selected");
        self.state
            .events
            .emit(ChatEvent::ConversationSelected { conversation: id });
        self.refresh_messages().await.map(|_| ())
    }

    /// Fetch the active conversation's messages. The query is disabled
    /// without an active conversation.
    pub async fn refresh_messages(&self) -> Result<Vec<Message>, ClientError> {
        let active = self.active();
        let key = active
            .as_ref()
            .map_or_else(|| QueryKey::from(MESSAGES_QUERY_KEY), messages_key);
        let options = self.state.options.enabled(active.is_some());
        let api = Arc::clone(&self.state.api);
        let fetched = self
            .state
            .messages
            .fetch(&key, options, move || async move {
                match active {
                    Some(id) => api.list_messages(&id).await,
                    None => Ok(Vec::new()),
                }
            })
            .await?;
        Ok(fetched.unwrap_or_default())
    }

    /// Messages of the active conversation; empty when nothing is selected.
    pub fn visible_messages(&self) -> Vec<Message> {
        self.active()
            .and_then(|id| self.messages_for(&id))
            .unwrap_or_default()
    }

    pub fn messages_for(&self, id: &ConversationId) -> Option<Vec<Message>> {
        self.state.messages.get_data(&messages_key(id))
    }

    pub fn messages_snapshot(&self, id: &ConversationId) -> QuerySnapshot<Vec<Message>> {
        self.state.messages.snapshot(&messages_key(id))
    }

    pub fn watch_messages(
        &self,
        id: &ConversationId,
    ) -> watch::Receiver<QuerySnapshot<Vec<Message>>> {
        self.state.messages.subscribe(&messages_key(id))
    }

    // -- Mutations -----------------------------------------------------------

    /// Create a conversation on the server, put it at the head of the list
    /// and make it active.
    pub async fn new_conversation(&self) -> Result<Conversation, ClientError> {
        let hooks = CreateConversationHooks {
            state: &self.state,
        };
        let api = Arc::clone(&self.state.api);
        let conversation = self
            .create
            .run(&hooks, (), move |()| async move {
                api.create_conversation().await
            })
            .await?;
        info!(conversation = %conversation.id, "Started new conversation");
        Ok(conversation)
    }

    /// Submit `content` to the active conversation, creating one first when
    /// nothing is selected.
    pub async fn submit(&self, content: &str) -> Result<SendOutcome, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let conversation = match self.active() {
            Some(id) => id,
            None => self.new_conversation().await?.id,
        };
        self.send_to(conversation, content).await
    }

    /// Send `content` to `conversation` with an optimistic user message that
    /// is rolled back if the request fails.
    pub async fn send_to(
        &self,
        conversation: ConversationId,
        content: &str,
    ) -> Result<SendOutcome, ClientError> {
        if content.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let vars = SendVars::new(conversation, content);
        let correlation = vars.correlation;
        let target = vars.conversation.clone();

        let hooks = SendMessageHooks {
            state: &self.state,
        };
        let api = Arc::clone(&self.state.api);
        let response = self
            .send
            .run(&hooks, vars, move |vars| async move {
                api.send_message(&vars.conversation, &vars.content).await
            })
            .await?;

        Ok(SendOutcome {
            conversation: target,
            correlation,
            reply: response.assistant,
        })
    }

    /// Remove a conversation locally, then ask the server to delete it.
    ///
    /// The local removal is not rolled back when the server call fails; the
    /// conversation stays hidden for the rest of the session.
    pub async fn delete_conversation(&self, id: &ConversationId) {
        lock(&self.state.deleted).insert(id.clone());
        self.state
            .conversations
            .update_existing(&conversations_key(), |list| list.retain(|c| &c.id != id));
        self.state.messages.remove(&messages_key(id));
        lock(&self.state.reverted).remove(id);

        let was_active = {
            let mut active = lock(&self.state.active);
            if active.as_ref() == Some(id) {
                *active = None;
                true
            } else {
                false
            }
        };

        info!(conversation = %id, "Conversation deleted");
        self.state.events.emit(ChatEvent::ConversationDeleted {
            conversation: id.clone(),
        });
        if was_active {
            self.state
                .events
                .emit(ChatEvent::ConversationSelected { conversation: None });
        }

        if let Err(e) = self.state.api.delete_conversation(id).await {
            warn!(conversation = %id, error = %e, "Server-side delete failed");
        }
    }

    // -- Status --------------------------------------------------------------

    /// Whether any send is in flight.
    pub fn is_sending(&self) -> bool {
        self.send.is_pending()
    }

    pub fn is_creating(&self) -> bool {
        self.create.is_pending()
    }

    pub fn send_status(&self) -> MutationStatus {
        self.send.status()
    }

    pub fn watch_send_status(&self) -> watch::Receiver<MutationStatus> {
        self.send.subscribe()
    }

    pub fn phase(&self, id: &ConversationId) -> ConversationPhase {
        if self.active().as_ref() != Some(id) {
            return ConversationPhase::Unselected;
        }
        if self.state.is_sending_in(id) {
            return ConversationPhase::Sending;
        }
        if lock(&self.state.reverted).contains(id) {
            return ConversationPhase::Reverted;
        }
        let snapshot = self.messages_snapshot(id);
        if snapshot.is_loading() {
            ConversationPhase::Loading
        } else {
            ConversationPhase::Ready
        }
    }

    /// Phase of the active conversation, if any.
    pub fn active_phase(&self) -> Option<ConversationPhase> {
        self.active().map(|id| self.phase(&id))
    }

    /// Error of the last message fetch for `id`, if it failed.
    pub fn messages_error(&self, id: &ConversationId) -> Option<String> {
        match self.messages_snapshot(id).status {
            QueryStatus::Error(e) => Some(e),
            _ => None,
        }
    }
}
