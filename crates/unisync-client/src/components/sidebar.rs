use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use unisync_shared::models::Conversation;
use unisync_shared::types::ConversationId;

use crate::format::relative_time;

/// Placeholder rows drawn while the list is loading.
pub const SKELETON_ROWS: usize = 5;

const UNTITLED: &str = "Untitled";
const NO_MESSAGES: &str = "No messages yet";
const JUST_NOW: &str = "Just now";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: ConversationId,
    pub title: String,
    pub preview: String,
    pub time: String,
    pub active: bool,
    pub deletable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarView {
    Loading { rows: usize },
    Entries(Vec<SidebarEntry>),
}

/// Conversation list. Only the collapsed flag lives here.
#[derive(Debug, Default)]
pub struct Sidebar {
    collapsed: bool,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub fn view(
        &self,
        conversations: &[Conversation],
        active: Option<&ConversationId>,
        loading: bool,
        now: DateTime<Utc>,
    ) -> SidebarView {
        if loading {
            return SidebarView::Loading {
                rows: SKELETON_ROWS,
            };
        }
        let entries = conversations
            .iter()
            .map(|conv| SidebarEntry {
                id: conv.id.clone(),
                title: non_empty_or(&conv.title, UNTITLED),
                preview: non_empty_or(&conv.last_message, NO_MESSAGES),
                time: if conv.has_timestamp() {
                    relative_time(conv.timestamp, now)
                } else {
                    JUST_NOW.to_string()
                },
                active: active == Some(&conv.id),
                deletable: !self.collapsed,
            })
            .collect();
        SidebarView::Entries(entries)
    }

    pub fn render(&self, view: &SidebarView) -> String {
        let mut out = String::new();
        match view {
            SidebarView::Loading { rows } => {
                for _ in 0..*rows {
                    out.push_str("  ░░░░░░░░░░░░░░░░\n");
                }
            }
            SidebarView::Entries(entries) if entries.is_empty() => {
                out.push_str("  (no conversations)\n");
            }
            SidebarView::Entries(entries) => {
                for entry in entries {
                    let marker = if entry.active { '>' } else { ' ' };
                    if self.collapsed {
                        let _ = writeln!(out, "{marker} [{}]", entry.id);
                    } else {
                        let _ = writeln!(
                            out,
                            "{marker} [{}] {}  ({})\n      {}",
                            entry.id, entry.title, entry.time, entry.preview
                        );
                    }
                }
            }
        }
        out
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn conv(id: &str, title: &str, preview: &str, at: DateTime<Utc>) -> Conversation {
        Conversation {
            title: title.into(),
            last_message: preview.into(),
            ..Conversation::new(id.into(), at)
        }
    }

    #[test]
    fn test_loading_shows_skeleton() {
        let view = Sidebar::new().view(&[], None, true, Utc::now());
        assert_eq!(view, SidebarView::Loading { rows: 5 });
    }

    #[test]
    fn test_fallbacks_and_relative_time() {
        let now = Utc::now();
        let list = vec![
            conv("1", "", "", now - Duration::minutes(5)),
            conv("2", "Deadlines", "Three due", DateTime::<Utc>::default()),
        ];
        let SidebarView::Entries(entries) = Sidebar::new().view(&list, Some(&"2".into()), false, now)
        else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].title, "Untitled");
        assert_eq!(entries[0].preview, "No messages yet");
        assert_eq!(entries[0].time, "5 minutes ago");
        assert!(!entries[0].active);
        assert_eq!(entries[1].time, "Just now");
        assert!(entries[1].active);
    }

    #[test]
    fn test_collapsed_hides_delete() {
        let mut sidebar = Sidebar::new();
        sidebar.toggle_collapsed();
        let list = vec![conv("1", "A", "b", Utc::now())];
        let SidebarView::Entries(entries) = sidebar.view(&list, None, false, Utc::now()) else {
            panic!("expected entries");
        };
        assert!(!entries[0].deletable);
        assert_eq!(sidebar.render(&SidebarView::Entries(entries)), "  [1]\n");
    }
}
