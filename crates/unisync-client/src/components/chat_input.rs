pub const DEFAULT_PLACEHOLDER: &str =
    "Ask about assignments, emails, schedules, or campus events…";

/// Keys the input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    ShiftEnter,
}

/// Message composer. Owns its draft and the voice toggle.
#[derive(Debug)]
pub struct ChatInput {
    draft: String,
    placeholder: String,
    disabled: bool,
    listening: bool,
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatInput {
    pub fn new() -> Self {
        Self::with_placeholder(DEFAULT_PLACEHOLDER)
    }

    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            draft: String::new(),
            placeholder: placeholder.into(),
            disabled: false,
            listening: false,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn toggle_voice(&mut self) {
        self.listening = !self.listening;
    }

    pub fn can_submit(&self) -> bool {
        !self.disabled && !self.draft.trim().is_empty()
    }

    /// Take the trimmed draft, leaving the input empty. `None` when blank or
    /// disabled; the draft is then kept as is.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let message = self.draft.trim().to_string();
        self.draft.clear();
        Some(message)
    }

    /// Apply a key press. Returns the submitted message on Enter.
    pub fn handle_key(&mut self, key: Key) -> Option<String> {
        match key {
            Key::Enter => self.submit(),
            Key::ShiftEnter => {
                self.draft.push('\n');
                None
            }
            Key::Char(c) => {
                self.draft.push(c);
                None
            }
            Key::Backspace => {
                self.draft.pop();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> ChatInput {
        let mut input = ChatInput::new();
        for c in text.chars() {
            input.handle_key(Key::Char(c));
        }
        input
    }

    #[test]
    fn test_enter_submits_trimmed_and_clears() {
        let mut input = typed("  hello  ");
        assert_eq!(input.handle_key(Key::Enter).as_deref(), Some("hello"));
        assert_eq!(input.draft(), "");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut input = typed("a");
        assert_eq!(input.handle_key(Key::ShiftEnter), None);
        input.handle_key(Key::Char('b'));
        assert_eq!(input.submit().as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_blank_draft_is_ignored() {
        let mut input = typed("   ");
        assert_eq!(input.handle_key(Key::Enter), None);
        assert_eq!(input.draft(), "   ");
    }

    #[test]
    fn test_disabled_blocks_submit() {
        let mut input = typed("hi");
        input.set_disabled(true);
        assert_eq!(input.submit(), None);
        assert_eq!(input.draft(), "hi");
        input.set_disabled(false);
        assert_eq!(input.submit().as_deref(), Some("hi"));
    }

    #[test]
    fn test_defaults() {
        let mut input = ChatInput::new();
        assert_eq!(input.placeholder(), DEFAULT_PLACEHOLDER);
        assert!(!input.is_listening());
        input.toggle_voice();
        assert!(input.is_listening());
    }
}
