use anyhow::Result;
use car_configurator::{
    catalog::{Catalog, GroupKind},
    config::Config,
    pricing::format_price,
};
use colored::Colorize;

/// Execute the catalog command
///
/// Without a model lists every model and series; with one lists the option
/// groups it offers.
pub fn execute(cfg: &Config, model: Option<&str>) -> Result<()> {
    let catalog = Catalog::load(cfg.catalog.path.as_deref())?;

    let Some(id) = model else {
        println!("{}", "Models:".bold());
        for car in &catalog.models {
            println!(
                "  {:<10} {:<24} {:<10} {}",
                car.id.cyan(),
                car.name,
                car.category.dimmed(),
                format_price(car.base_price)
            );
        }
        if !catalog.series.is_empty() {
            println!();
            println!("{}", "Series:".bold());
            for series in &catalog.series {
                println!(
                    "  {:<10} {} {}",
                    series.name.cyan(),
                    series.models.join(", "),
                    format!("({})", series.description).dimmed()
                );
            }
        }
        return Ok(());
    };

    let car = catalog
        .model(id)
        .ok_or_else(|| anyhow::anyhow!("Unknown model: {}", id))?;
    println!(
        "{} {} ({})",
        car.name.bold(),
        format_price(car.base_price),
        car.category
    );

    for group in catalog.groups_for(Some(id)) {
        let kind = match group.kind {
            GroupKind::Exclusive => "choose one",
            GroupKind::Multiple => "choose any",
        };
        println!();
        println!("  {} [{}] {}", group.label.cyan(), group.name, kind.dimmed());
        for option in &group.options {
            println!("    {:<36} +{}", option.value, format_price(option.price));
        }
    }
    Ok(())
}
