use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Course not found: {0}")]
    NotFound(Uuid),

    #[error("Course not found: {0}")]
    SlugNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Cache error: {0}")]
    Cache(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::NotFound(format!("Course {} not found", id)),
            CatalogError::SlugNotFound(slug) => {
                AppError::NotFound(format!("Course '{}' not found", slug))
            }
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Database(e) => AppError::InternalServerError(e.to_string()),
            CatalogError::Cache(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
