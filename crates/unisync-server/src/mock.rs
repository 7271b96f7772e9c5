//! Canned assistant answers and sample conversations.

use chrono::{DateTime, Duration, Utc};

use unisync_shared::models::{Confidence, Message, SourceItem, SourceKind, SourceSection};
use unisync_shared::types::MessageId;

pub const REPLY_TEXT: &str = "Based on your connected accounts, here's what I found:";

fn source_item(
    id: &str,
    title: &str,
    description: Option<&str>,
    date: &str,
    time: &str,
) -> SourceItem {
    SourceItem {
        description: description.map(str::to_string),
        date: Some(date.to_string()),
        time: Some(time.to_string()),
        ..SourceItem::new(id, title)
    }
}

/// The assistant's answer with its Canvas and Calendar findings.
pub fn assistant_reply(id: MessageId, now: DateTime<Utc>) -> Message {
    Message {
        sources: Some(vec![
            SourceSection {
                kind: SourceKind::Canvas,
                title: "Canvas Assignments".to_string(),
                items: vec![
                    source_item(
                        "1",
                        "CS 301 - Algorithm Analysis",
                        Some("Problem set on dynamic programming"),
                        "Friday, Jan 31",
                        "11:59 PM",
                    ),
                    source_item(
                        "2",
                        "MATH 245 - Linear Algebra",
                        Some("Chapter 5 exercises"),
                        "Saturday, Feb 1",
                        "11:59 PM",
                    ),
                ],
            },
            SourceSection {
                kind: SourceKind::Calendar,
                title: "Upcoming Meetings".to_string(),
                items: vec![source_item(
                    "3",
                    "Study Group - CS 301",
                    None,
                    "Tomorrow",
                    "3:00 PM",
                )],
            },
        ]),
        confidence: Some(Confidence::High),
        sources_checked: Some(vec!["Canvas".to_string(), "Outlook".to_string()]),
        last_synced: Some(now - Duration::minutes(2)),
        ..Message::assistant(id, REPLY_TEXT, now)
    }
}

/// One sample conversation: title, question, answer and age in minutes.
pub struct SeedConversation {
    pub id: &'static str,
    pub title: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
    pub age_minutes: i64,
}

pub const SEED: [SeedConversation; 2] = [
    SeedConversation {
        id: "1",
        title: "Assignment deadlines",
        question: "What assignments are due this week?",
        answer: "You have 3 assignments due this week",
        age_minutes: 30,
    },
    SeedConversation {
        id: "2",
        title: "Today's schedule",
        question: "What does my day look like?",
        answer: "Your first class is at 9:00 AM",
        age_minutes: 120,
    },
];
