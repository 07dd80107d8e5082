use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::{FieldError, LookupError, WorkflowError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {message}")]
    FieldValidation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_position: Option<u8>,
    pub message: String,
}

impl From<&FieldError> for ValidationDetail {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field.clone(),
            guest_position: err.guest_position,
            message: err.message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            ApiError::FieldValidation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidTerm(msg) => ApiError::Validation(msg),
            LookupError::Unavailable(ref source) => {
                tracing::error!(error = %source, "Guest lookup failed");
                ApiError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::IllegalTransition { .. } | WorkflowError::SubmissionInProgress => {
                ApiError::Conflict(err.to_string())
            }
            WorkflowError::UnknownCandidate(_) => ApiError::NotFound(err.to_string()),
            WorkflowError::Validation(ref fields) => ApiError::FieldValidation {
                message: err.to_string(),
                details: fields.iter().map(ValidationDetail::from).collect(),
            },
            WorkflowError::Lookup(e) => e.into(),
            WorkflowError::Answers(e) => ApiError::Validation(e.to_string()),
            WorkflowError::Submission(e) => ApiError::ServiceUnavailable(e.user_message().into()),
        }
    }
}
