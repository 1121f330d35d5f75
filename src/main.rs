use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use car_configurator::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load configuration before tracing so the configured level and format
    // apply; a broken file is reported after logging is up
    let loaded = config::load_config(&args.config);
    match &loaded {
        Ok(cfg) => init_tracing(&cfg.server.log_level, &cfg.server.log_format),
        Err(_) => init_tracing("info", "text"),
    }
    let cfg = loaded?;

    match args.get_command() {
        cli::Commands::Serve => commands::serve::execute(cfg).await?,
        cli::Commands::Test => commands::test::execute(&cfg)?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
        },
        cli::Commands::Catalog { model } => commands::catalog::execute(&cfg, model.as_deref())?,
        cli::Commands::Model { model } => commands::session::select_model(&cfg, &model)?,
        cli::Commands::Select { group, value } => {
            commands::session::change_option(&cfg, &group, &value, true)?
        }
        cli::Commands::Deselect { group, value } => {
            commands::session::change_option(&cfg, &group, &value, false)?
        }
        cli::Commands::Show => commands::session::show(&cfg)?,
        cli::Commands::Save { name } => commands::session::save(&cfg, name).await?,
        cli::Commands::Load { id } => commands::session::load(&cfg, &id).await?,
        cli::Commands::Compare => commands::session::compare(&cfg)?,
        cli::Commands::Version => {
            println!("Car Configurator v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
