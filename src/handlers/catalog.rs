use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::catalog::{CarModel, OptionGroup, Series};
use crate::error::AppError;
use crate::handlers::AppState;

#[derive(Debug, Serialize)]
pub struct ModelOptionsResponse {
    pub model: CarModel,
    pub groups: Vec<OptionGroup>,
}

#[derive(Debug, Serialize)]
pub struct SeriesModelsResponse {
    pub series: Series,
    pub models: Vec<CarModel>,
}

/// GET /api/series
pub async fn list_series(State(state): State<AppState>) -> Json<Vec<Series>> {
    Json(state.catalog.series.clone())
}

/// GET /api/models/:series
pub async fn series_models(
    State(state): State<AppState>,
    Path(series): Path<String>,
) -> Result<Json<SeriesModelsResponse>, AppError> {
    let found = state
        .catalog
        .series(&series)
        .ok_or_else(|| AppError::SeriesNotFound(series.clone()))?;

    Ok(Json(SeriesModelsResponse {
        models: state.catalog.series_models(found),
        series: found.clone(),
    }))
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<CarModel>> {
    Json(state.catalog.models.clone())
}

/// GET /api/options/:model
///
/// Option groups offered for the model, filtered by availability
pub async fn model_options(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> Result<Json<ModelOptionsResponse>, AppError> {
    let car = state
        .catalog
        .model(&model)
        .cloned()
        .ok_or_else(|| AppError::ModelNotFound(model.clone()))?;

    Ok(Json(ModelOptionsResponse {
        groups: state.catalog.groups_for(Some(&model)),
        model: car,
    }))
}
