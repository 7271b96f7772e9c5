//! View-models for the chat screen. Each one owns only its local UI flags;
//! data comes from the chat controller.

pub mod chat_input;
pub mod message_bubble;
pub mod sidebar;
pub mod source_badge;
pub mod suggested_prompts;
pub mod top_nav;

pub use chat_input::ChatInput;
pub use message_bubble::MessageBubble;
pub use sidebar::Sidebar;
pub use source_badge::SourceBadge;
pub use top_nav::{Route, TopNav};
