pub mod api;
pub mod chat;
pub mod components;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod format;
pub mod mutation;
pub mod pages;
pub mod query;
pub mod repl;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ClientConfig;
use crate::repl::Repl;
use crate::state::AppState;

pub use crate::chat::ChatController;
pub use crate::error::ClientError;

/// Start the terminal client: logging, configuration, local storage, then
/// the command loop.
pub async fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("unisync_client_lib=info,unisync_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting UniSync terminal client");

    let config = ClientConfig::from_env();
    let state = AppState::open(config)?;
    Repl::new(state).run().await
}
