//! In-memory [`ChatApi`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Semaphore;

use unisync_shared::models::{Conversation, Message};
use unisync_shared::protocol::SendMessageResponse;
use unisync_shared::text::{preview_from, title_from};
use unisync_shared::types::{ConversationId, MessageId};

use crate::api::ChatApi;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListConversations,
    ListMessages(ConversationId),
    Create(ConversationId),
    Send(ConversationId, String),
    Delete(ConversationId),
}

#[derive(Default)]
struct Backend {
    conversations: Vec<Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

pub(crate) struct FakeApi {
    backend: Mutex<Backend>,
    calls: Mutex<Vec<Call>>,
    send_gate: Semaphore,
    messages_gate: Semaphore,
    next_id: AtomicUsize,
    fail_next_send: AtomicBool,
    fail_next_messages: AtomicBool,
    fail_deletes: AtomicBool,
    fail_lists: AtomicBool,
}

impl FakeApi {
    pub(crate) const REPLY: &'static str =
        "Based on your connected accounts, here's what I found: two assignments due Friday.";

    pub(crate) fn new() -> Self {
        Self {
            backend: Mutex::new(Backend::default()),
            calls: Mutex::new(Vec::new()),
            send_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            messages_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            next_id: AtomicUsize::new(100),
            fail_next_send: AtomicBool::new(false),
            fail_next_messages: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
        }
    }

    /// Sends block until [`FakeApi::release_send`] is called, once per send.
    pub(crate) fn gated() -> Self {
        Self {
            send_gate: Semaphore::new(0),
            ..Self::new()
        }
    }

    /// Two conversations, "1" and "2", each with one exchange.
    pub(crate) fn with_seed() -> Self {
        let api = Self::new();
        let now = Utc::now();
        {
            let mut backend = api.backend.lock().unwrap();
            for (id, title, question, answer, age) in [
                (
                    "1",
                    "Assignment deadlines",
                    "What is due this week?",
                    "CS 301 Problem Set 4 is due Friday.",
                    2,
                ),
                (
                    "2",
                    "Today's schedule",
                    "What classes do I have today?",
                    "You have Data Structures at 10:00.",
                    5,
                ),
            ] {
                let at = now - Duration::hours(age);
                let conv_id = ConversationId::from(id);
                let messages = vec![
                    Message::user(MessageId(format!("{id}-q")), question, at),
                    Message::assistant(MessageId(format!("{id}-a")), answer, at),
                ];
                backend.conversations.push(Conversation {
                    title: title.to_string(),
                    last_message: preview_from(answer),
                    message_ids: messages.iter().map(|m| m.id.clone()).collect(),
                    ..Conversation::new(conv_id.clone(), at)
                });
                backend.messages.insert(conv_id, messages);
            }
        }
        api
    }

    /// Seeded, with message loads blocked until [`FakeApi::release_messages`].
    pub(crate) fn with_seed_gated_messages() -> Self {
        Self {
            messages_gate: Semaphore::new(0),
            ..Self::with_seed()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn release_send(&self) {
        self.send_gate.add_permits(1);
    }

    pub(crate) fn release_messages(&self) {
        self.messages_gate.add_permits(1);
    }

    pub(crate) fn fail_next_messages(&self) {
        self.fail_next_messages.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found() -> ClientError {
        ClientError::server(404, "Conversation not found")
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.record(Call::ListConversations);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ClientError::server(503, "Request failed: 503"));
        }
        Ok(self.backend.lock().unwrap().conversations.clone())
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, ClientError> {
        self.record(Call::ListMessages(id.clone()));
        if let Ok(permit) = self.messages_gate.acquire().await {
            permit.forget();
        }
        if self.fail_next_messages.swap(false, Ordering::SeqCst) {
            return Err(ClientError::server(503, "Request failed: 503"));
        }
        self.backend
            .lock()
            .unwrap()
            .messages
            .get(id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_conversation(&self) -> Result<Conversation, ClientError> {
        let id = ConversationId(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        self.record(Call::Create(id.clone()));
        let conversation = Conversation::new(id.clone(), Utc::now());
        let mut backend = self.backend.lock().unwrap();
        backend.conversations.insert(0, conversation.clone());
        backend.messages.insert(id, Vec::new());
        Ok(conversation)
    }

    async fn send_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<SendMessageResponse, ClientError> {
        self.record(Call::Send(id.clone(), content.to_string()));
        if let Ok(permit) = self.send_gate.acquire().await {
            permit.forget();
        }
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(ClientError::server(500, "Assistant unavailable"));
        }

        let mut backend = self.backend.lock().unwrap();
        let Backend {
            conversations,
            messages,
        } = &mut *backend;
        let history = messages.get_mut(id).ok_or_else(Self::not_found)?;
        let first = history.is_empty();
        let now = Utc::now();
        let n = history.len();
        history.push(Message::user(MessageId(format!("{id}-{n}")), content, now));
        history.push(Message::assistant(
            MessageId(format!("{id}-{}", n + 1)),
            Self::REPLY,
            now,
        ));
        if let Some(conv) = conversations.iter_mut().find(|c| &c.id == id) {
            if first {
                conv.title = title_from(content);
            }
            conv.record_exchange(preview_from(Self::REPLY), now);
        }
        Ok(SendMessageResponse {
            assistant: Self::REPLY.to_string(),
        })
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ClientError> {
        self.record(Call::Delete(id.clone()));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ClientError::server(500, "Request failed: 500"));
        }
        let mut backend = self.backend.lock().unwrap();
        backend.conversations.retain(|c| &c.id != id);
        backend.messages.remove(id);
        Ok(())
    }
}
