//! Mapping of domain failures onto HTTP responses

use axum::http::StatusCode;
use axum::Json;

use super::ApiResponse;
use crate::domain::DomainError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn api_error(error: DomainError) -> ApiError {
    let status = status_for(&error);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        tracing::error!(error = %error, "Request failed on storage");
    }
    (status, Json(ApiResponse::error(error.to_string())))
}
