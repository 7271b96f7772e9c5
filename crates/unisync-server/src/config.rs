//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the development server starts with zero
//! configuration on the port the client expects.

use std::net::SocketAddr;
use std::time::Duration;

use unisync_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8000`
    pub http_addr: SocketAddr,

    /// Bearer token required on `/chat/*` routes.
    /// Env: `AUTH_TOKEN`
    /// Default: empty (no authentication).
    pub auth_token: Option<String>,

    /// Human-readable name for this server instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"UniSync Dev Server"`
    pub instance_name: String,

    /// Artificial latency before the assistant answers.
    /// Env: `MOCK_REPLY_DELAY_MS`
    /// Default: `0`
    pub reply_delay: Duration,

    /// Whether to start with the two sample conversations.
    /// Env: `SEED_DATA` (true/false)
    /// Default: `true`
    pub seed_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            auth_token: None,
            instance_name: "UniSync Dev Server".to_string(),
            reply_delay: Duration::ZERO,
            seed_data: true,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("instance_name", &self.instance_name)
            .field("reply_delay", &self.reply_delay)
            .field("seed_data", &self.seed_data)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(token) = lookup("AUTH_TOKEN") {
            if !token.trim().is_empty() {
                config.auth_token = Some(token.trim().to_string());
            }
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        if let Some(val) = lookup("MOCK_REPLY_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.reply_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %val, "Invalid MOCK_REPLY_DELAY_MS, using 0"),
            }
        }

        if let Some(val) = lookup("SEED_DATA") {
            config.seed_data = val != "false" && val != "0";
        }

        config
    }
}
