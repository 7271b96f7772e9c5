use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedPrompt {
    pub text: &'static str,
    pub icon: &'static str,
}

pub const SUGGESTED_PROMPTS: [SuggestedPrompt; 6] = [
    SuggestedPrompt {
        text: "What assignments are due this week?",
        icon: "📚",
    },
    SuggestedPrompt {
        text: "Summarize my unread Canvas notifications",
        icon: "📘",
    },
    SuggestedPrompt {
        text: "Do I have any meetings today?",
        icon: "📅",
    },
    SuggestedPrompt {
        text: "What events are happening near me?",
        icon: "🎓",
    },
    SuggestedPrompt {
        text: "Show my upcoming deadlines",
        icon: "⏰",
    },
    SuggestedPrompt {
        text: "Any important emails I missed?",
        icon: "📧",
    },
];

/// Prompt picked by its 1-based number as shown by [`render`].
pub fn pick(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| SUGGESTED_PROMPTS.get(i))
        .map(|p| p.text)
}

pub fn render() -> String {
    let mut out = String::new();
    for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} {}", i + 1, prompt.icon, prompt.text);
    }
    out
}
