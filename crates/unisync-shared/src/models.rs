//! Chat domain model exchanged between the client and the server.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so the same types serve as the JSON wire format.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::NEW_CONVERSATION_TITLE;
use crate::error::SharedError;
use crate::types::{ConversationId, MessageId};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// The four data sources UniSync aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Canvas,
    Calendar,
    Email,
    Events,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Canvas,
        SourceKind::Calendar,
        SourceKind::Email,
        SourceKind::Events,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Canvas => "canvas",
            SourceKind::Calendar => "calendar",
            SourceKind::Email => "email",
            SourceKind::Events => "events",
        }
    }
}

impl FromStr for SourceKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canvas" => Ok(SourceKind::Canvas),
            "calendar" => Ok(SourceKind::Calendar),
            "email" => Ok(SourceKind::Email),
            "events" => Ok(SourceKind::Events),
            other => Err(SharedError::UnknownSourceKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One entry inside a source section (an assignment, a meeting, an email...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(
        default,
        deserialize_with = "known_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
}

impl SourceItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            date: None,
            time: None,
            course: None,
            priority: None,
        }
    }
}

/// Structured evidence backing an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSection {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub title: String,
    pub items: Vec<SourceItem>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Partial,
}

/// One turn of a conversation.
///
/// `sources`, `confidence`, `sources_checked` and `last_synced` only ever
/// appear on assistant messages; [`Message::normalized`] enforces this for
/// data coming off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "known_sections",
        skip_serializing_if = "Option::is_none"
    )]
    pub sources: Option<Vec<SourceSection>>,
    #[serde(
        default,
        deserialize_with = "known_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_checked: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            timestamp,
            sources: None,
            confidence: None,
            sources_checked: None,
            last_synced: None,
        }
    }

    pub fn assistant(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(id, content, timestamp)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Strip assistant-only metadata from user messages.
    pub fn normalized(mut self) -> Self {
        if self.role == Role::User {
            self.sources = None;
            self.confidence = None;
            self.sources_checked = None;
            self.last_synced = None;
        }
        self
    }

    pub fn has_sources(&self) -> bool {
        self.sources.as_ref().is_some_and(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Summary of a conversation as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_message: String,
    /// Unix epoch when the server sent none.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message_ids: Vec<MessageId>,
}

impl Conversation {
    pub fn new(id: ConversationId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            title: NEW_CONVERSATION_TITLE.to_string(),
            last_message: String::new(),
            timestamp,
            message_ids: Vec::new(),
        }
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp != DateTime::<Utc>::default()
    }

    /// Record a completed exchange. The timestamp never moves backwards.
    pub fn record_exchange(&mut self, preview: String, at: DateTime<Utc>) {
        self.last_message = preview;
        if at > self.timestamp {
            self.timestamp = at;
        }
    }
}

// ---------------------------------------------------------------------------
// Integrations & timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Connected,
    Pending,
    NotConnected,
}

/// An external account UniSync reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub status: IntegrationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Class,
    Deadline,
    Meeting,
    Event,
}

/// An entry on the schedule timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
    pub title: String,
    pub time: String,
    pub date: DateTime<Utc>,
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawSection {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    #[serde(default)]
    items: Vec<SourceItem>,
}

/// Decode source sections, dropping any whose kind is not one of the four
/// known sources.
fn known_sections<'de, D>(deserializer: D) -> Result<Option<Vec<SourceSection>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawSection>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|sections| {
        sections
            .into_iter()
            .filter_map(|s| {
                let kind = SourceKind::from_str(&s.kind).ok()?;
                Some(SourceSection {
                    kind,
                    title: s.title,
                    items: s.items,
                })
            })
            .collect()
    }))
}

/// Decode an optional enum, treating values it does not know as absent.
fn known_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 30, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_message_wire_names() {
        let mut msg = Message::assistant(MessageId::from("m1"), "hi", ts());
        msg.sources_checked = Some(vec!["Canvas".into()]);
        msg.confidence = Some(Confidence::High);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["sourcesChecked"][0], "Canvas");
        assert_eq!(json["confidence"], "high");
        assert!(json.get("sources").is_none());
    }

    #[test]
    fn test_unknown_source_kind_is_dropped() {
        let json = r#"{
            "id": "m2", "role": "assistant", "content": "x",
            "timestamp": "2025-01-30T09:00:00Z",
            "sources": [
                {"type": "canvas", "title": "Canvas Assignments", "items": [{"id": "1", "title": "PS"}]},
                {"type": "slack", "title": "Slack", "items": []}
            ]
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let sources = msg.sources.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].kind, SourceKind::Canvas);
        assert_eq!(sources[0].items[0].title, "PS");
    }

    #[test]
    fn test_normalized_strips_user_metadata() {
        let mut msg = Message::user(MessageId::from("u"), "hello", ts());
        msg.confidence = Some(Confidence::Partial);
        msg.sources = Some(vec![]);
        let msg = msg.normalized();
        assert!(msg.confidence.is_none());
        assert!(msg.sources.is_none());
    }

    #[test]
    fn test_normalized_keeps_assistant_metadata() {
        let mut msg = Message::assistant(MessageId::from("a"), "hello", ts());
        msg.confidence = Some(Confidence::High);
        assert_eq!(msg.normalized().confidence, Some(Confidence::High));
    }

    #[test]
    fn test_conversation_defaults_from_sparse_json() {
        let conv: Conversation =
            serde_json::from_str(r#"{"id": "1", "timestamp": "2025-01-30T09:00:00Z"}"#).unwrap();
        assert_eq!(conv.title, "");
        assert!(conv.message_ids.is_empty());
    }

    #[test]
    fn test_record_exchange_timestamp_is_monotonic() {
        let mut conv = Conversation::new(ConversationId::from("1"), ts());
        conv.record_exchange("later".into(), ts() - chrono::Duration::hours(1));
        assert_eq!(conv.timestamp, ts());
        assert_eq!(conv.last_message, "later");
    }

    #[test]
    fn test_integration_status_snake_case() {
        let json = serde_json::to_string(&IntegrationStatus::NotConnected).unwrap();
        assert_eq!(json, "\"not_connected\"");
    }

    #[test]
    fn test_unknown_confidence_and_priority_decode_as_none() {
        let json = r#"[{
            "id": "m3", "role": "assistant", "content": "x",
            "timestamp": "2025-01-30T09:00:00Z",
            "confidence": "certain",
            "sources": [
                {"type": "canvas", "title": "Canvas", "items": [
                    {"id": "1", "title": "PS", "priority": "urgent"},
                    {"id": "2", "title": "Quiz", "priority": "high"}
                ]}
            ]
        }, {
            "id": "m4", "role": "assistant", "content": "y",
            "timestamp": "2025-01-30T09:00:00Z",
            "confidence": "partial"
        }]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].confidence, None);
        let items = &messages[0].sources.as_ref().unwrap()[0].items;
        assert_eq!(items[0].priority, None);
        assert_eq!(items[1].priority, Some(Priority::High));
        assert_eq!(messages[1].confidence, Some(Confidence::Partial));
    }
}
