use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use unisync_shared::models::{Confidence, Message, SourceItem, SourceSection};

use super::source_badge::SourceBadge;
use crate::format::relative_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// One message plus the expand/collapse state of its source sections.
#[derive(Debug, Clone)]
pub struct MessageBubble {
    message: Message,
    expanded: Vec<bool>,
}

impl MessageBubble {
    pub fn new(message: Message) -> Self {
        let sections = message.sources.as_ref().map_or(0, Vec::len);
        Self {
            message,
            expanded: vec![true; sections],
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn alignment(&self) -> Alignment {
        if self.message.is_user() {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    /// Source sections, shown for assistant messages only.
    pub fn sections(&self) -> &[SourceSection] {
        match &self.message.sources {
            Some(sections) if !self.message.is_user() => sections,
            _ => &[],
        }
    }

    pub fn is_expanded(&self, section: usize) -> bool {
        self.expanded.get(section).copied().unwrap_or(false)
    }

    pub fn toggle_section(&mut self, section: usize) {
        if let Some(open) = self.expanded.get_mut(section) {
            *open = !*open;
        }
    }

    /// Trust indicators, or `None` when the message carries neither checked
    /// sources nor a sync time.
    pub fn trust_line(&self, now: DateTime<Utc>) -> Option<String> {
        let msg = &self.message;
        if msg.is_user() || (msg.sources_checked.is_none() && msg.last_synced.is_none()) {
            return None;
        }
        let mut parts = Vec::new();
        if let Some(checked) = &msg.sources_checked {
            parts.push(format!("Checked {}", checked.join(" + ")));
        }
        if let Some(at) = msg.last_synced {
            parts.push(format!("Last synced {}", relative_time(at, now)));
        }
        if let Some(confidence) = msg.confidence {
            parts.push(
                match confidence {
                    Confidence::High => "High confidence",
                    Confidence::Partial => "Partial data",
                }
                .to_string(),
            );
        }
        Some(parts.join("  "))
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let (prefix, indent) = match self.alignment() {
            Alignment::Right => ("You", "                "),
            Alignment::Left => ("UniSync", ""),
        };
        for (i, line) in self.message.content.lines().enumerate() {
            if i == 0 {
                let _ = writeln!(out, "{indent}{prefix}: {line}");
            } else {
                let _ = writeln!(out, "{indent}  {line}");
            }
        }

        for (i, section) in self.sections().iter().enumerate() {
            let badge = SourceBadge::for_kind(section.kind);
            let toggle = if self.is_expanded(i) { '-' } else { '+' };
            let _ = writeln!(out, "  {toggle} {badge} {}", section.title);
            if self.is_expanded(i) {
                for item in &section.items {
                    let _ = writeln!(out, "      • {}", item.title);
                    if let Some(description) = &item.description {
                        let _ = writeln!(out, "        {description}");
                    }
                    if let Some(meta) = item_meta(item) {
                        let _ = writeln!(out, "        {meta}");
                    }
                }
            }
        }

        if let Some(trust) = self.trust_line(now) {
            let _ = writeln!(out, "  {trust}");
        }
        out
    }
}

/// Date and time of a source item joined with `" · "`.
pub fn item_meta(item: &SourceItem) -> Option<String> {
    let parts: Vec<&str> = [item.date.as_deref(), item.time.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use unisync_shared::models::SourceKind;
    use unisync_shared::types::MessageId;

    fn reply(now: DateTime<Utc>) -> Message {
        let mut item = SourceItem::new("1", "CS 301 - Algorithm Analysis");
        item.date = Some("Friday, Jan 31".into());
        item.time = Some("11:59 PM".into());
        let mut msg = Message::assistant(MessageId::from("a1"), "Here you go", now);
        msg.sources = Some(vec![SourceSection {
            kind: SourceKind::Canvas,
            title: "Canvas Assignments".into(),
            items: vec![item],
        }]);
        msg.sources_checked = Some(vec!["Canvas".into(), "Outlook".into()]);
        msg.last_synced = Some(now - Duration::minutes(2));
        msg.confidence = Some(Confidence::High);
        msg
    }

    #[test]
    fn test_alignment_by_role() {
        let now = Utc::now();
        let user = MessageBubble::new(Message::user(MessageId::from("u"), "hi", now));
        assert_eq!(user.alignment(), Alignment::Right);
        assert!(user.trust_line(now).is_none());
        assert_eq!(MessageBubble::new(reply(now)).alignment(), Alignment::Left);
    }

    #[test]
    fn test_trust_line() {
        let now = Utc::now();
        let bubble = MessageBubble::new(reply(now));
        assert_eq!(
            bubble.trust_line(now).unwrap(),
            "Checked Canvas + Outlook  Last synced 2 minutes ago  High confidence"
        );
    }

    #[test]
    fn test_partial_confidence_label() {
        let now = Utc::now();
        let mut msg = reply(now);
        msg.confidence = Some(Confidence::Partial);
        msg.last_synced = None;
        let line = MessageBubble::new(msg).trust_line(now).unwrap();
        assert_eq!(line, "Checked Canvas + Outlook  Partial data");
    }

    #[test]
    fn test_sections_start_expanded_and_toggle() {
        let now = Utc::now();
        let mut bubble = MessageBubble::new(reply(now));
        assert!(bubble.is_expanded(0));
        assert!(bubble.render(now).contains("Friday, Jan 31 · 11:59 PM"));

        bubble.toggle_section(0);
        assert!(!bubble.is_expanded(0));
        let rendered = bubble.render(now);
        assert!(rendered.contains("+ [Canvas] Canvas Assignments"));
        assert!(!rendered.contains("CS 301"));
    }

    #[test]
    fn test_item_meta_joins_present_parts() {
        let mut item = SourceItem::new("1", "x");
        assert_eq!(item_meta(&item), None);
        item.time = Some("3:00 PM".into());
        assert_eq!(item_meta(&item).as_deref(), Some("3:00 PM"));
        item.date = Some("Tomorrow".into());
        assert_eq!(item_meta(&item).as_deref(), Some("Tomorrow · 3:00 PM"));
    }
}
