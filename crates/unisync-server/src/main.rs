use tracing::info;
use tracing_subscriber::EnvFilter;

use unisync_server::api::{self, AppState};
use unisync_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,unisync_server=debug")),
        )
        .init();

    info!("Starting UniSync dev server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    info!(
        instance = %config.instance_name,
        auth_enabled = config.auth_token.is_some(),
        seed_data = config.seed_data,
        "Instance settings"
    );

    let http_addr = config.http_addr;
    let app_state = AppState::new(config);

    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
