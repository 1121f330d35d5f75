use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{ConfigurationSummary, LoadResponse, SaveRequest, SaveResponse};
use crate::error::AppError;
use crate::handlers::AppState;

/// POST /api/save-configuration
pub async fn save_configuration(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Json(request) = payload?;
    let saved = state.repository.insert(&request).await?;
    info!(id = %saved.id, name = %saved.name, model = ?saved.model, "Configuration saved");

    Ok(Json(SaveResponse {
        success: true,
        id: Some(saved.id),
        message: Some("Configuration saved successfully".to_string()),
    }))
}

/// GET /api/load-configuration/:id
pub async fn load_configuration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LoadResponse>, AppError> {
    let saved = state
        .repository
        .get(&id)
        .await?
        .ok_or_else(|| AppError::ConfigurationNotFound(id.clone()))?;

    Ok(Json(LoadResponse::from(saved)))
}

/// GET /api/configurations
pub async fn list_configurations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConfigurationSummary>>, AppError> {
    Ok(Json(state.repository.list().await?))
}

/// DELETE /api/configurations/:id
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let name = state
        .repository
        .delete(&id)
        .await?
        .ok_or_else(|| AppError::ConfigurationNotFound(id.clone()))?;

    info!(id = %id, name = %name, "Configuration deleted");
    Ok(Json(json!({
        "success": true,
        "message": format!("Configuration \"{}\" deleted successfully", name),
    })))
}
