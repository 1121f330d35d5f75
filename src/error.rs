use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error types for the HTTP service
#[derive(Debug)]
pub enum AppError {
    /// Unknown car model
    ModelNotFound(String),
    /// Unknown series name
    SeriesNotFound(String),
    /// No saved configuration with this id
    ConfigurationNotFound(String),
    /// Malformed request payload
    BadRequest(String),
    /// Database error
    Database(sqlx::Error),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            Self::SeriesNotFound(msg) => write!(f, "Series not found: {}", msg),
            Self::ConfigurationNotFound(msg) => write!(f, "Configuration not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Database(err) => write!(f, "Database error: {}", err),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ModelNotFound(msg) => (StatusCode::NOT_FOUND, format!("Unknown model: {}", msg)),
            Self::SeriesNotFound(msg) => (StatusCode::NOT_FOUND, format!("Unknown series: {}", msg)),
            Self::ConfigurationNotFound(msg) => (
                StatusCode::NOT_FOUND,
                format!("Configuration not found: {}", msg),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ModelNotFound(_) => "model_not_found",
        AppError::SeriesNotFound(_) => "series_not_found",
        AppError::ConfigurationNotFound(_) => "configuration_not_found",
        AppError::BadRequest(_) => "bad_request",
        AppError::Database(_) => "database_error",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

/// Failures talking to the remote save/load endpoint
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Remote reported failure: {0}")]
    Rejected(String),
}
