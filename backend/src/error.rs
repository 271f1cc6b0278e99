//! Domain error type and its HTTP mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::orm::{PatchError, ValidationErrors};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("caller identity required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::Validation(_) | CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
            CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
            CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<PatchError> for CatalogError {
    fn from(err: PatchError) -> Self {
        let field = err
            .pointer()
            .map(|p| p.trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "patch".to_string());
        Self::Validation(ValidationErrors::single(field, err.to_string()))
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            CatalogError::NotFound => status.into_response(),
            CatalogError::Validation(errors) => (status, Json(json!({ "errors": errors }))).into_response(),
            CatalogError::BadRequest(message) | CatalogError::Forbidden(message) => {
                (status, Json(json!({ "error": message }))).into_response()
            }
            CatalogError::Unauthorized => status.into_response(),
            CatalogError::Database(e) => {
                tracing::error!(error = ?e, "Database operation failed");
                (status, Json(json!({ "error": "Database operation failed" }))).into_response()
            }
        }
    }
}
