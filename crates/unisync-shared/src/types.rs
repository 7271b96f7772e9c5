use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SharedError;

// Conversation ids are opaque strings: the server may hand out "1", "2", ...
// while the client generates UUIDs for the conversations it creates itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a user-supplied id, rejecting blanks and path separators.
    pub fn parse(s: &str) -> Result<Self, SharedError> {
        let s = s.trim();
        if s.is_empty() || s.contains('/') {
            return Err(SharedError::InvalidId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn messages_path(&self) -> String {
        format!("{}/{}/messages", crate::constants::CONVERSATIONS_PATH, self.0)
    }

    pub fn path(&self) -> String {
        format!("{}/{}", crate::constants::CONVERSATIONS_PATH, self.0)
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies one submission from the moment it is typed until the server
/// answers. The optimistic user message is keyed by it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn user_message_id(&self) -> MessageId {
        MessageId(format!("local-{}", self.0))
    }

    pub fn assistant_message_id(&self) -> MessageId {
        MessageId(format!("reply-{}", self.0))
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
