use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::SiteError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

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
    pub message: String,
}

impl ApiError {
    /// Status code and machine-readable error code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ApiError::SaveFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "save_failed"),
            ApiError::SubmissionFailed(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "submission_failed")
            }
            ApiError::UploadFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "upload_failed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::SaveFailed(msg)
            | ApiError::SubmissionFailed(msg)
            | ApiError::UploadFailed(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::RateLimited => "Too many requests. Please try again later.".into(),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".into()
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SiteError> for ApiError {
    fn from(err: SiteError) -> Self {
        let message = err.to_string();
        match err {
            SiteError::SiteNotFound | SiteError::GuestNotFound => ApiError::NotFound(message),
            SiteError::Validation(_) => ApiError::Validation(message),
            SiteError::SlugTaken(_) => ApiError::Conflict(message),
            SiteError::RsvpClosed => ApiError::Forbidden(message),
            SiteError::SaveFailed => ApiError::SaveFailed(message),
            SiteError::SubmissionFailed => ApiError::SubmissionFailed(message),
            SiteError::UploadFailed => ApiError::UploadFailed(message),
            SiteError::Unavailable => ApiError::ServiceUnavailable(message),
        }
    }
}

impl From<domain::StoreError> for ApiError {
    fn from(err: domain::StoreError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        match err {
            domain::StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".into()),
            domain::StoreError::Unavailable(_) => ApiError::ServiceUnavailable(
                "Service temporarily unavailable, please try again".into(),
            ),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = match details.as_slice() {
            [only] => only.message.clone(),
            _ => format!("{} validation errors", details.len()),
        };

        ApiError::Validation(message)
    }
}
