//! HTTP error responses
//!
//! Every failure becomes `{"detail": "..."}` with a matching status code.
//! Storage failures are logged with their cause and reported without it.

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;
use crate::StorefrontError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
    source: Option<StorefrontError>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into(), source: None }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, detail) }
    pub fn validation(detail: impl Into<String>) -> Self { Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail) }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn detail(&self) -> &str { &self.detail }
}

impl From<StorefrontError> for ApiError {
    fn from(e: StorefrontError) -> Self {
        let status = match &e {
            StorefrontError::NotFound(_) => StatusCode::NOT_FOUND,
            StorefrontError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StorefrontError::Forbidden(_) => StatusCode::FORBIDDEN,
            StorefrontError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StorefrontError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = match &e {
            StorefrontError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        Self { status, detail, source: Some(e) }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self { Self::validation(e.to_string()) }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self { Self::validation(e.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self { Self::validation(e.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(status = %self.status, error = %source, "request failed"),
                None => tracing::error!(status = %self.status, detail = %self.detail, "request failed"),
            }
        }
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::OrderError;

    #[test]
    fn test_domain_errors_map_to_400() {
        let e = ApiError::from(StorefrontError::from(OrderError::UnpaidOrder));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.detail(), "You have unpaid order");
    }

    #[test]
    fn test_storage_errors_hide_cause() {
        let e = ApiError::from(StorefrontError::Storage(sqlx::Error::PoolTimedOut));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.detail(), "Internal server error");
    }
}
