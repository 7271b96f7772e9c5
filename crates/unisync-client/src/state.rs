//! Application state owned by the terminal front-end.
//!
//! [`AppState`] ties together configuration, the local storage database, the
//! credential loaded from it and the page controllers.

use std::sync::Arc;

use tracing::info;

use unisync_store::Database;

use crate::api::ChatApi;
use crate::chat::ChatController;
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::ClientError;
use crate::pages::{AppSettings, ChatPage, HomePage, Navigation};
use crate::query::QueryOptions;
use crate::transport::ApiClient;

pub struct AppState {
    pub config: ClientConfig,
    pub database: Database,
    pub credentials: Credentials,
    pub settings: AppSettings,
    pub nav: Navigation,
    pub home: HomePage,
    pub chat: ChatPage,
}

impl AppState {
    /// Open the database named by `config` (or the platform default).
    pub fn open(config: ClientConfig) -> Result<Self, ClientError> {
        let database = match &config.data_dir {
            Some(dir) => Database::open_in(dir)?,
            None => Database::new()?,
        };
        Self::with_database(config, database)
    }

    pub fn with_database(config: ClientConfig, database: Database) -> Result<Self, ClientError> {
        let credentials = Credentials::from_storage(&database)?;
        let settings = AppSettings::load(&database)?;
        info!(
            api = %config.api_base,
            authenticated = credentials.is_authenticated(),
            "Client state loaded"
        );
        let chat = ChatPage::new(Self::controller(&config, &credentials));
        let home = HomePage::new(config.user_name.clone());
        Ok(Self {
            config,
            database,
            credentials,
            settings,
            nav: Navigation::new(),
            home,
            chat,
        })
    }

    fn controller(config: &ClientConfig, credentials: &Credentials) -> ChatController {
        let api: Arc<dyn ChatApi> = Arc::new(ApiClient::new(
            config.api_base.clone(),
            credentials.clone(),
        ));
        let options = QueryOptions {
            stale_time: config.stale_time,
            ..QueryOptions::default()
        };
        ChatController::with_options(api, options)
    }

    /// Persist `token` and start over with a client that sends it.
    /// Cached conversations belong to the previous identity and are dropped.
    pub fn set_token(&mut self, token: &str) -> Result<(), ClientError> {
        self.database.set_token(token)?;
        self.credentials = Credentials::bearer(token);
        self.chat = ChatPage::new(Self::controller(&self.config, &self.credentials));
        info!("Token updated");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.database.clear_token()?;
        self.credentials = Credentials::anonymous();
        self.chat = ChatPage::new(Self::controller(&self.config, &self.credentials));
        info!("Logged out");
        Ok(())
    }

    pub fn save_settings(&self) -> Result<(), ClientError> {
        self.settings.save(&self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_persisted_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::default()
        };

        let mut state = AppState::open(config.clone()).unwrap();
        assert!(!state.credentials.is_authenticated());
        state.set_token(" secret ").unwrap();
        drop(state);

        let mut state = AppState::open(config.clone()).unwrap();
        assert_eq!(state.credentials.token(), Some("secret"));
        state.logout().unwrap();
        drop(state);

        let state = AppState::open(config).unwrap();
        assert!(!state.credentials.is_authenticated());
    }

    #[test]
    fn test_settings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::default()
        };
        let mut state = AppState::open(config.clone()).unwrap();
        state.settings.weekly_digest = true;
        state.save_settings().unwrap();
        drop(state);

        assert!(AppState::open(config).unwrap().settings.weekly_digest);
    }
}
