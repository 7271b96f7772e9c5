/// Application name
pub const APP_NAME: &str = "UniSync";

/// Default API base address used when none is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Default HTTP port of the development server
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Local storage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Local storage key holding the serialized user settings
pub const SETTINGS_STORAGE_KEY: &str = "settings";

/// Title given to a conversation before its first exchange
pub const NEW_CONVERSATION_TITLE: &str = "New conversation";

/// Conversation titles are cut to this many characters (plus an ellipsis)
pub const TITLE_MAX_CHARS: usize = 30;

/// Conversation previews are cut to this many characters
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Query cache key of the conversation list
pub const CONVERSATIONS_QUERY_KEY: &str = "conversations";

/// Query cache key prefix of per-conversation message lists
pub const MESSAGES_QUERY_KEY: &str = "messages";

/// REST paths
pub const CONVERSATIONS_PATH: &str = "/chat/conversations";
