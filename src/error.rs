use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{store::StoreError, validation::FieldError};

/// Errors a handler can return. Each maps to one HTTP status and the uniform
/// `{"status": "error", "message": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: ErrorMessage,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, ErrorMessage::Fields(errors)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorMessage::Text(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorMessage::Text(msg)),
            ApiError::Store(e) => {
                error!(error = %e, "store failure");
                internal()
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal failure");
                internal()
            }
        };

        let body = Json(ErrorBody {
            status: "error",
            message,
        });
        (status, body).into_response()
    }
}

fn internal() -> (StatusCode, ErrorMessage) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorMessage::Text("Internal server error".into()),
    )
}
