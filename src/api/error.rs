//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::flags::FlagError;
use crate::lookup::LookupError;
use crate::registry::RegistryError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Medicine already flagged by this customer")]
    AlreadyFlagged,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::AlreadyFlagged => (
                StatusCode::CONFLICT,
                "ALREADY_FLAGGED",
                "You have already flagged this medicine".to_string(),
            ),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::EmptyQuery => ApiError::BadRequest(err.to_string()),
            LookupError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<FlagError> for ApiError {
    fn from(err: FlagError) -> Self {
        match err {
            FlagError::Duplicate => ApiError::AlreadyFlagged,
            FlagError::MedicineNotFound(_) | FlagError::FlagNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            FlagError::UnknownCustomer(_) => ApiError::BadRequest(err.to_string()),
            FlagError::Forbidden => ApiError::Forbidden(err.to_string()),
            FlagError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::MedicineNotFound(_) => ApiError::NotFound(err.to_string()),
            RegistryError::Forbidden => ApiError::Forbidden(err.to_string()),
            RegistryError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}
