use anyhow::Result;
use car_configurator::{
    catalog::{Catalog, GroupKind},
    client::HttpRemoteStore,
    config::Config,
    controller::{Configurator, LoadOutcome, SaveOutcome},
    preview::{AnyAsset, AssetResolver, DirectoryAssets},
    store::FileStore,
    surface::OptionChange,
    validation,
};
use colored::Colorize;
use std::{sync::Arc, time::Duration};
use tracing::info;

use super::terminal::TerminalSurface;

/// Restore the session kept in the configured state file
fn open(cfg: &Config) -> Result<Configurator<FileStore>> {
    let catalog = Arc::new(Catalog::load(cfg.catalog.path.as_deref())?);
    let assets: Arc<dyn AssetResolver> = match &cfg.catalog.asset_dir {
        Some(dir) => Arc::new(DirectoryAssets::new(dir, cfg.catalog.image_base.as_str())),
        None => Arc::new(AnyAsset),
    };

    Ok(Configurator::restore(
        catalog,
        FileStore::new(&cfg.client.state_file),
        assets,
        cfg.catalog.image_base.as_str(),
    ))
}

fn remote(cfg: &Config) -> HttpRemoteStore {
    HttpRemoteStore::new(
        reqwest::Client::new(),
        cfg.client.base_url.as_str(),
        Duration::from_secs(cfg.client.timeout_seconds),
    )
}

/// Print validation findings for the current state
fn print_advice(configurator: &Configurator<FileStore>) {
    let report = validation::validate(
        configurator.catalog(),
        configurator.model(),
        configurator.configuration(),
    );

    for issue in &report.errors {
        println!("{} {}", "!".yellow().bold(), issue.message.yellow());
    }
    for warning in &report.warnings {
        println!("{} {}", "?".dimmed(), warning.message.dimmed());
    }
    for suggestion in &report.suggestions {
        println!("{} {}", "Tip:".dimmed(), suggestion.message);
    }
}

/// Execute the model command
pub fn select_model(cfg: &Config, model: &str) -> Result<()> {
    let mut configurator = open(cfg)?;
    let mut surface = TerminalSurface::new(configurator.registry());

    configurator.select_model(&mut surface, model)?;
    println!("{} {}", "Model:".bold(), model.cyan());
    surface.print_summary();
    print_advice(&configurator);
    Ok(())
}

/// Execute the select and deselect commands
pub fn change_option(cfg: &Config, group: &str, value: &str, checked: bool) -> Result<()> {
    let mut configurator = open(cfg)?;

    match configurator.registry().lookup(group, value) {
        None if checked => anyhow::bail!(
            "'{}' is not offered in group '{}' for {}",
            value,
            group,
            configurator.model().unwrap_or("the current model")
        ),
        Some(entry) if !checked && entry.kind == GroupKind::Exclusive => anyhow::bail!(
            "'{}' allows one choice only; select another option instead",
            group
        ),
        _ => {}
    }

    let mut surface = TerminalSurface::new(configurator.registry());
    let change = if checked {
        OptionChange::checked(group, value)
    } else {
        OptionChange::unchecked(group, value)
    };

    if !configurator.handle_option_change(&mut surface, &change) {
        println!("{}", "Configuration unchanged".dimmed());
    }
    surface.print_summary();
    print_advice(&configurator);
    Ok(())
}

/// Execute the show command
pub fn show(cfg: &Config) -> Result<()> {
    let mut configurator = open(cfg)?;
    let mut surface = TerminalSurface::new(configurator.registry());

    println!(
        "{} {}",
        "Model:".bold(),
        configurator.model().unwrap_or("(none)").cyan()
    );
    configurator.refresh(&mut surface);
    surface.print_summary();
    print_advice(&configurator);
    Ok(())
}

/// Execute the save command
pub async fn save(cfg: &Config, name: Option<String>) -> Result<()> {
    let configurator = open(cfg)?;
    let mut surface = TerminalSurface::new(configurator.registry()).with_name(name);
    let remote = remote(cfg);

    match configurator.save(&mut surface, &remote).await {
        SaveOutcome::Saved { id: Some(id) } => println!("{} {}", "Id:".bold(), id.cyan()),
        SaveOutcome::Saved { id: None } => {}
        SaveOutcome::Cancelled => println!("{}", "Save cancelled".dimmed()),
        SaveOutcome::Failed => anyhow::bail!("Save to {} failed", remote.base_url()),
    }
    Ok(())
}

/// Execute the load command
///
/// The loaded configuration becomes the local session state.
pub async fn load(cfg: &Config, id: &str) -> Result<()> {
    let mut configurator = open(cfg)?;
    let mut surface = TerminalSurface::new(configurator.registry());
    let remote = remote(cfg);

    match configurator.load(&mut surface, &remote, id).await {
        LoadOutcome::Loaded { applied, skipped } => {
            configurator.persist();
            info!(id = %id, applied, skipped, "Session replaced by loaded configuration");
            if skipped > 0 {
                println!(
                    "{}",
                    format!("{} stored selection(s) not offered for this model", skipped).yellow()
                );
            }
            surface.print_summary();
            Ok(())
        }
        LoadOutcome::Failed => anyhow::bail!("Load of {} from {} failed", id, remote.base_url()),
    }
}

/// Execute the compare command
pub fn compare(cfg: &Config) -> Result<()> {
    let configurator = open(cfg)?;
    let mut surface = TerminalSurface::new(configurator.registry());
    configurator.compare(&mut surface);
    Ok(())
}
