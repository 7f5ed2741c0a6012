use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use tracing::{error, warn};

use crate::lifecycle::ResumeError;

pub type AppResult<T> = Result<T, AppError>;

/// Caller-visible failure. Rendered as `{"message": CODE}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn key_error() -> Self {
        Self::bad_request("KEY_ERROR")
    }

    pub fn json_decode_error() -> Self {
        Self::bad_request("JSON_DECODE_ERROR")
    }

    pub fn kind_mismatch() -> Self {
        Self::bad_request("RESUME_KIND_MISMATCH")
    }

    /// Also returned for resumes owned by another user.
    pub fn resume_not_found() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "RESUME_NOT_FOUND")
    }

    pub fn invalid_resume() -> Self {
        Self::new(StatusCode::NOT_FOUND, "INVALID_RESUME")
    }

    pub fn file_none() -> Self {
        Self::new(StatusCode::NOT_FOUND, "FILE_NONE")
    }

    pub fn invalid_token() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN")
    }

    pub fn invalid_user() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_USER")
    }

    pub fn internal<E: Display>(error: E) -> Self {
        error!(error = %error, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl From<ResumeError> for AppError {
    fn from(value: ResumeError) -> Self {
        match value {
            ResumeError::Validation(detail) => {
                warn!(%detail, "rejected request with missing fields");
                AppError::key_error()
            }
            ResumeError::Malformed(detail) => {
                warn!(%detail, "rejected request with undecodable body");
                AppError::json_decode_error()
            }
            ResumeError::NotFound => AppError::resume_not_found(),
            ResumeError::NoFile => AppError::file_none(),
            ResumeError::KindMismatch => AppError::kind_mismatch(),
            ResumeError::Store(err) => AppError::internal(err),
            ResumeError::Storage(err) => AppError::internal(format!("{err:#}")),
        }
    }
}
