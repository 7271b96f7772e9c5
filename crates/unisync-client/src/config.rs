//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero configuration
//! against a development server on localhost.

use std::path::PathBuf;
use std::time::Duration;

use unisync_shared::constants::DEFAULT_API_BASE;

use crate::error::ClientError;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base address every endpoint path is resolved against.
    /// Env: `UNISYNC_API_URL`
    /// Default: `http://localhost:8000`
    pub api_base: String,

    /// Directory holding the local storage database.
    /// Env: `UNISYNC_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Name used in the home page greeting.
    /// Env: `UNISYNC_USER_NAME`
    /// Default: `Jordan`
    pub user_name: String,

    /// How long fetched queries stay fresh.
    /// Env: `UNISYNC_QUERY_STALE_SECS`
    /// Default: unset (fresh until invalidated).
    pub stale_time: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: None,
            user_name: "Jordan".to_string(),
            stale_time: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("UNISYNC_API_URL") {
            match validate_base(&url) {
                Ok(()) => config.api_base = url,
                Err(e) => tracing::warn!(value = %url, error = %e, "Invalid UNISYNC_API_URL, using default"),
            }
        }

        if let Some(dir) = lookup("UNISYNC_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(name) = lookup("UNISYNC_USER_NAME") {
            if !name.trim().is_empty() {
                config.user_name = name.trim().to_string();
            }
        }

        if let Some(val) = lookup("UNISYNC_QUERY_STALE_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => config.stale_time = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(value = %val, "Invalid UNISYNC_QUERY_STALE_SECS, ignoring"),
            }
        }

        config
    }
}

/// The base address must be an absolute http(s) URL.
pub fn validate_base(url: &str) -> Result<(), ClientError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ClientError::Config(format!(
            "API base must start with http:// or https://, got {url:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.user_name, "Jordan");
        assert_eq!(config.stale_time, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("UNISYNC_API_URL", "https://api.unisync.edu"),
            ("UNISYNC_USER_NAME", "Sam"),
            ("UNISYNC_QUERY_STALE_SECS", "30"),
            ("UNISYNC_DATA_DIR", "/tmp/unisync"),
        ]);
        assert_eq!(config.api_base, "https://api.unisync.edu");
        assert_eq!(config.user_name, "Sam");
        assert_eq!(config.stale_time, Some(Duration::from_secs(30)));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/unisync")));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("UNISYNC_API_URL", "localhost:8000"),
            ("UNISYNC_QUERY_STALE_SECS", "soon"),
        ]);
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.stale_time, None);
    }
}
