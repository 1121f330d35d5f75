use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pricing::EstimateRules;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Where the service keeps saved configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// SQLite URL, e.g. "sqlite://data/configurations.db" or "sqlite::memory:"
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Settings for the CLI session talking to a running service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Local key-value file holding the session state
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            state_file: default_state_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Catalog TOML file; the built-in catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// URL prefix of preview images
    #[serde(default = "default_image_base")]
    pub image_base: String,
    /// Directory holding preview images. When unset every image is assumed
    /// to exist.
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            image_base: default_image_base(),
            asset_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default = "default_destination_fee")]
    pub destination_fee: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Package selections needed for the multi-package discount (0 disables)
    #[serde(default = "default_multi_package_min")]
    pub multi_package_min: usize,
    #[serde(default = "default_multi_package_discount")]
    pub multi_package_discount: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            destination_fee: default_destination_fee(),
            tax_rate: default_tax_rate(),
            multi_package_min: default_multi_package_min(),
            multi_package_discount: default_multi_package_discount(),
        }
    }
}

impl PricingConfig {
    pub fn rules(&self) -> EstimateRules {
        EstimateRules {
            destination_fee: self.destination_fee,
            tax_rate: self.tax_rate,
            multi_package_min: self.multi_package_min,
            multi_package_discount: self.multi_package_discount,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_database_url() -> String {
    "sqlite://data/configurations.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_state_file() -> PathBuf {
    PathBuf::from("data/state.json")
}

fn default_image_base() -> String {
    "/static/images".to_string()
}

fn default_destination_fee() -> f64 {
    995.0
}

fn default_tax_rate() -> f64 {
    0.08
}

fn default_multi_package_min() -> usize {
    3
}

fn default_multi_package_discount() -> f64 {
    200.0
}

/// Load configuration from an optional TOML file plus `CONFIGURATOR__*`
/// environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CONFIGURATOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be > 0");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.storage.max_connections == 0 {
        anyhow::bail!("Storage max_connections must be >= 1");
    }

    if cfg.client.timeout_seconds == 0 {
        anyhow::bail!("Client timeout_seconds must be >= 1");
    }

    if cfg.catalog.image_base.trim().is_empty() {
        anyhow::bail!("Catalog image_base cannot be empty");
    }

    if !(0.0..1.0).contains(&cfg.pricing.tax_rate) {
        anyhow::bail!("Pricing tax_rate must be in [0, 1), got {}", cfg.pricing.tax_rate);
    }

    if cfg.pricing.destination_fee < 0.0 || cfg.pricing.multi_package_discount < 0.0 {
        anyhow::bail!("Pricing fees and discounts cannot be negative");
    }

    Ok(())
}
