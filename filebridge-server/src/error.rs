//! API error → HTTP response mapping
//!
//! GET routes answer with `{"error": ...}` JSON; the upload route answers
//! with the plain-text messages the browser client matches on.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use filebridge_core::HostError;

use crate::host::ContextError;

/// Upload failure text expected by clients
pub const UPLOAD_FAILED: &str = "Failed to add file to project";

/// Unexpected upload failure text
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    /// 400, plain-text reason
    BadRequest(String),
    /// 404, JSON error
    NotFound(String),
    /// 500, JSON error with the given message
    Internal(String),
    /// 500, plain text [`UPLOAD_FAILED`]; carries the detail for the log
    UploadFailed(String),
    /// 500, plain text [`INTERNAL_ERROR`]; carries the detail for the log
    Unexpected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(reason) => {
                tracing::warn!("Bad request: {}", reason);
                plain_text(StatusCode::BAD_REQUEST, reason)
            }
            ApiError::NotFound(message) => {
                tracing::warn!("ERROR: {}", message);
                json_error(StatusCode::NOT_FOUND, message)
            }
            ApiError::Internal(message) => {
                tracing::error!("ERROR: {}", message);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::UploadFailed(detail) => {
                tracing::error!("{}: {}", UPLOAD_FAILED, detail);
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED.to_string())
            }
            ApiError::Unexpected(detail) => {
                tracing::error!("Error handling file upload: {}", detail);
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        }
    }
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        tracing::error!("Host context failure: {}", err);
        ApiError::Internal(INTERNAL_ERROR.to_string())
    }
}

impl From<HostError> for ApiError {
    fn from(err: HostError) -> Self {
        tracing::error!("Host failure: {}", err);
        ApiError::Internal(INTERNAL_ERROR.to_string())
    }
}
