use tokio::sync::broadcast;

use unisync_shared::models::Role;
use unisync_shared::types::{ConversationId, CorrelationId, MessageId};

const EVENT_CAPACITY: usize = 64;

/// Notifications emitted by the chat controller for whoever renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    ConversationsLoaded {
        count: usize,
    },
    ConversationCreated {
        conversation: ConversationId,
    },
    ConversationSelected {
        conversation: Option<ConversationId>,
    },
    ConversationDeleted {
        conversation: ConversationId,
    },
    MessageAppended {
        conversation: ConversationId,
        message: MessageId,
        role: Role,
    },
    SendFailed {
        conversation: ConversationId,
        correlation: CorrelationId,
        error: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ChatEvent) {
        // No subscribers is fine: the terminal front-end polls the views.
        if self.tx.send(event).is_err() {
            tracing::trace!("chat event dropped, no subscribers");
        }
    }
}
