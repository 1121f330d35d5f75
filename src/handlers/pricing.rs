use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::api::QuoteRequest;
use crate::error::AppError;
use crate::handlers::AppState;
use crate::pricing::{Estimate, PriceBreakdown};
use crate::validation::{self, ValidationReport};

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub breakdown: PriceBreakdown,
    pub estimate: Estimate,
}

/// POST /api/calculate-price
pub async fn calculate_price(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, AppError> {
    let Json(request) = payload?;
    let model = request.model.as_deref();
    if let Some(id) = model {
        if state.catalog.model(id).is_none() {
            return Err(AppError::ModelNotFound(id.to_string()));
        }
    }

    let base = state.catalog.base_price(model);
    Ok(Json(PriceResponse {
        breakdown: PriceBreakdown::from_configuration(base, &request.configuration),
        estimate: Estimate::calculate(&state.catalog, model, &request.configuration, &state.rules),
    }))
}

/// POST /api/validate-configuration
pub async fn validate_configuration(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<ValidationReport>, AppError> {
    let Json(request) = payload?;
    Ok(Json(validation::validate(
        &state.catalog,
        request.model.as_deref(),
        &request.configuration,
    )))
}
