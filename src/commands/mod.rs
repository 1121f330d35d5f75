//! Command implementations for the CLI
//!
//! - serve: Start the configurator service
//! - test: Test configuration and catalog validity
//! - config: Configuration display
//! - catalog: Browse models and option groups
//! - session: Drive a local configurator session (model, select, save, load, ...)

pub mod catalog;
pub mod config;
pub mod serve;
pub mod session;
pub mod terminal;
