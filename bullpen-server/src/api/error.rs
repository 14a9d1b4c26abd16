use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bullpen_types::ErrorResponse;

use crate::error::CoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    /// Duplicate action; carries the stable reason string
    Conflict(&'static str),
    Unprocessable(&'static str),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details, reason) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", Some(msg), None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", Some(msg), None),
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, "Conflict", None, Some(reason)),
            ApiError::Unprocessable(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable Entity",
                None,
                Some(reason),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    Some("An unexpected error occurred".to_string()),
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            error: message.to_string(),
            details,
            reason: reason.map(str::to_string),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            // Ownership failures look like missing entities
            CoreError::PermissionDenied => ApiError::NotFound("not found".to_string()),
            CoreError::Conflict(reason) => ApiError::Conflict(reason.as_str()),
            CoreError::InvalidState(reason) => ApiError::Unprocessable(reason.as_str()),
            CoreError::Storage(err) => ApiError::InternalError(format!("{err:#}")),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}
