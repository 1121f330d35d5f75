use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "configurator", version, about = "Car configurator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the configurator service (default)
    Serve,

    /// Test configuration and catalog validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// List models, or the option groups offered for one model
    Catalog {
        /// Show option groups for this model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Choose the car model for the current session
    Model {
        /// Model id, e.g. X3
        model: String,
    },

    /// Select an option
    Select {
        /// Option group, e.g. exterior_color
        group: String,
        /// Option value, e.g. "Black Sapphire Metallic"
        value: String,
    },

    /// Remove an option from a multi-select group
    Deselect {
        group: String,
        value: String,
    },

    /// Show the current configuration and price
    Show,

    /// Save the current configuration to the service
    Save {
        /// Name to save under; prompts when omitted
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Load a saved configuration from the service
    Load {
        /// Configuration id returned by save
        id: String,
    },

    /// Compare saved configurations
    Compare,

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
