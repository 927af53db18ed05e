use std::fmt;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;

pub const ADMIN_REQUIRED: &str = "Access denied. Admin privileges required.";

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{ "success": false, "message": ... }`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Logs an unexpected failure and hides its details from the client.
    pub fn internal<E: fmt::Debug>(e: E) -> Self {
        tracing::error!("Service failure: {e:?}");
        ApiError::Internal
    }

    pub fn status(&self) -> StatusCode {
        use ApiError::*;

        match self {
            BadRequest(_) => StatusCode::BAD_REQUEST,
            MissingToken | Unauthorized(_) => StatusCode::UNAUTHORIZED,
            InvalidToken | Forbidden(_) => StatusCode::FORBIDDEN,
            NotFound(_) => StatusCode::NOT_FOUND,
            Conflict(_) => StatusCode::CONFLICT,
            Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        use DomainError::*;

        if error.is_internal() {
            return ApiError::internal(error);
        }

        let message = error.to_string();
        match error {
            Validation(_) | NotResident | UnknownDocumentType | InvalidStatus(_)
            | NoFieldsToUpdate | NotPending => ApiError::BadRequest(message),
            InvalidCredentials | NotBarangayAccount | NotResidentAccount | IncorrectPassword => {
                ApiError::Unauthorized(message)
            }
            Forbidden(_) => ApiError::Forbidden(message),
            NotFound(_) => ApiError::NotFound(message),
            Conflict(_) | InvalidTransition { .. } => ApiError::Conflict(message),
            Store(_) | Password(_) | Token(_) | TrackingNumberExhausted => ApiError::Internal,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {rejection}");
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {rejection}");
        ApiError::BadRequest("Invalid path parameter".into())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query: {rejection}");
        ApiError::BadRequest("Invalid query parameters".into())
    }
}
