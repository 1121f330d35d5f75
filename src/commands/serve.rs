use anyhow::Result;
use car_configurator::{config::Config, server};
use colored::Colorize;
use tracing::info;

/// Execute the serve command
///
/// Blocks until the server shuts down.
pub async fn execute(cfg: Config) -> Result<()> {
    println!("{}", "Starting car configurator service...".green());
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        database = %cfg.storage.database_url,
        "Starting car configurator"
    );

    server::start_server(cfg).await
}
