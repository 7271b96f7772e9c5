//! Small text helpers shared by the client views and the development server.

use crate::constants::{PREVIEW_MAX_CHARS, TITLE_MAX_CHARS};

/// First `max` characters of `s` (char-based, never splits a code point).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Conversation title derived from the first user message.
pub fn title_from(content: &str) -> String {
    let head = truncate_chars(content, TITLE_MAX_CHARS);
    if head.len() < content.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// Sidebar preview derived from the latest assistant reply.
pub fn preview_from(content: &str) -> String {
    truncate_chars(content, PREVIEW_MAX_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_short_is_untouched() {
        assert_eq!(title_from("Hello"), "Hello");
    }

    #[test]
    fn test_title_long_is_cut_with_ellipsis() {
        let title = title_from("What assignments are due this week?");
        assert_eq!(title, "What assignments are due this ...");
    }

    #[test]
    fn test_title_exactly_thirty_chars() {
        let s = "a".repeat(30);
        assert_eq!(title_from(&s), s);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("📚📘📅", 2), "📚📘");
    }

    #[test]
    fn test_preview_has_no_ellipsis() {
        let s = "x".repeat(80);
        assert_eq!(preview_from(&s).len(), 50);
    }
}
