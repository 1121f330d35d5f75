use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    catalog::Catalog,
    config::Config,
    handlers::{self, AppState},
    storage::ConfigurationRepository,
};

/// Start the configurator service
///
/// Loads the catalog, opens the configuration database, binds the configured
/// address and serves until SIGINT or SIGTERM.
pub async fn start_server(config: Config) -> Result<()> {
    let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref())?);
    let repository = ConfigurationRepository::connect(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;

    let state = AppState {
        catalog: catalog.clone(),
        repository,
        rules: Arc::new(config.pricing.rules()),
    };
    let app = create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting car configurator on {}", addr);
    info!(
        "Catalog: {} models, {} option groups",
        catalog.models.len(),
        catalog.groups.len()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Build the router with every route and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/series", get(handlers::catalog::list_series))
        .route("/api/models", get(handlers::catalog::list_models))
        .route("/api/models/:series", get(handlers::catalog::series_models))
        .route("/api/options/:model", get(handlers::catalog::model_options))
        .route("/api/calculate-price", post(handlers::pricing::calculate_price))
        .route(
            "/api/validate-configuration",
            post(handlers::pricing::validate_configuration),
        )
        .route(
            "/api/save-configuration",
            post(handlers::configurations::save_configuration),
        )
        .route(
            "/api/load-configuration/:id",
            get(handlers::configurations::load_configuration),
        )
        .route(
            "/api/configurations",
            get(handlers::configurations::list_configurations),
        )
        .route(
            "/api/configurations/:id",
            delete(handlers::configurations::delete_configuration),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, initiating graceful shutdown"),
        _ = terminate => info!("SIGTERM received, initiating graceful shutdown"),
    }
}
