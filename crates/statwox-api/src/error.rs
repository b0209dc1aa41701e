use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use statwox_auth::error::AuthError;
use statwox_core::error::CoreError;
use statwox_export::error::ExportError;
use statwox_storage::error::StorageError;
use statwox_submission::error::{RejectionKind, SubmissionError};

/// Unified API error type for all route handlers.
///
/// Each variant carries the user-facing message, except `Internal`, whose
/// message is logged and replaced by a generic one.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    /// The target exists but its lifecycle state forbids the operation.
    InvalidState(String),
    Validation(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn survey_not_found() -> Self {
        ApiError::NotFound("Survey not found".to_string())
    }

    pub fn comment_not_found() -> Self {
        ApiError::NotFound("Comment not found".to_string())
    }

    pub fn not_author() -> Self {
        ApiError::Forbidden("Not authorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidState(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
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
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::InvalidState(msg)
            | ApiError::Validation(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                "Internal server error".to_string()
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, .. } => ApiError::NotFound(not_found_message(entity)),
            StorageError::Duplicate(_) => ApiError::Conflict(e.to_string()),
            StorageError::QuotaExceeded(_) => SubmissionError::QuotaReached.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        let message = e.to_string();
        match e.kind() {
            RejectionKind::InvalidState => ApiError::InvalidState(message),
            RejectionKind::Unauthorized => ApiError::Unauthorized(message),
            RejectionKind::Forbidden => ApiError::Forbidden(message),
            RejectionKind::Conflict => ApiError::Conflict(message),
            RejectionKind::Validation => ApiError::Validation(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Validation(e.to_string())
    }
}

fn not_found_message(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => format!("{}{} not found", first.to_ascii_uppercase(), chars.as_str()),
        None => "Not found".to_string(),
    }
}
