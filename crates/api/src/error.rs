use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use site_content_core::store::StoreError;

/// API error type that maps to JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payloadTooLarge", msg.clone())
            }
            ApiError::Store(err) => match err {
                StoreError::Validation(e) => {
                    (StatusCode::BAD_REQUEST, "validationError", e.to_string())
                }
                StoreError::InvalidBackupId(_) => {
                    (StatusCode::BAD_REQUEST, "badRequest", err.to_string())
                }
                StoreError::BackupNotFound(_) => (StatusCode::NOT_FOUND, "notFound", err.to_string()),
                StoreError::Migration(e) => {
                    tracing::error!("Migration error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "migrationError",
                        "Legacy content could not be migrated".to_string(),
                    )
                }
                StoreError::Io { .. } | StoreError::Corrupt { .. } | StoreError::Encode(_) => {
                    tracing::error!("Storage error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "storageError",
                        "Content storage failed, please retry".to_string(),
                    )
                }
            },
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
