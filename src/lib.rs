pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod model;
pub mod preview;
pub mod pricing;
pub mod registry;
pub mod server;
pub mod storage;
pub mod store;
pub mod surface;
pub mod validation;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `level` when set. `format` is "json" or anything
/// else for plain text. Can only be called once.
pub fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
