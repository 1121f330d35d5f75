use anyhow::Result;
use car_configurator::config::Config;
use colored::Colorize;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration, file and environment merged
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}
