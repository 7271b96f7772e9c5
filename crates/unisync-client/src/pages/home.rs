use chrono::{Local, Timelike};

use super::Navigation;
use crate::components::chat_input::ChatInput;
use crate::components::suggested_prompts;

pub const TAGLINE: &str = "Ready when you are.";
pub const FOOTER: &str =
    "UniSync connects to Canvas, Outlook, and campus systems to help you stay organized.";

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// Landing page: greeting, a large input and the suggested prompts. Anything
/// submitted here is handed to the chat page.
pub struct HomePage {
    user_name: String,
    pub input: ChatInput,
}

impl HomePage {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            input: ChatInput::new(),
        }
    }

    pub fn headline(&self, hour: u32) -> String {
        format!("{}, {}", greeting(hour), self.user_name)
    }

    /// Submit the draft. Returns whether navigation happened.
    pub fn submit(&mut self, nav: &mut Navigation) -> bool {
        match self.input.submit() {
            Some(message) => {
                nav.navigate_with_message(message);
                true
            }
            None => false,
        }
    }

    /// Pick a suggested prompt by its number.
    pub fn pick_prompt(&mut self, number: usize, nav: &mut Navigation) -> bool {
        match suggested_prompts::pick(number) {
            Some(prompt) => {
                nav.navigate_with_message(prompt);
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n\n{}\n{}\n",
            self.headline(Local::now().hour()),
            TAGLINE,
            suggested_prompts::render(),
            FOOTER
        )
    }
}
