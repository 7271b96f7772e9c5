//! Conversation/message synchronization.
//!
//! [`ChatController`] owns the conversation list cache, the per-conversation
//! message caches and the active-conversation pointer. Presentation code only
//! reads from it; every write goes through one of its operations.

mod controller;
mod mutations;

pub use controller::{ChatController, ConversationPhase, SendOutcome};
pub use mutations::SendVars;

use unisync_shared::constants::{CONVERSATIONS_QUERY_KEY, MESSAGES_QUERY_KEY};
use unisync_shared::types::ConversationId;

use crate::query::QueryKey;

pub fn conversations_key() -> QueryKey {
    QueryKey::from(CONVERSATIONS_QUERY_KEY)
}

pub fn messages_key(id: &ConversationId) -> QueryKey {
    QueryKey::new([MESSAGES_QUERY_KEY, id.as_str()])
}
