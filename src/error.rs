//! Error types for the OCR highlight server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::upload::UploadError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the HTTP API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFile => StatusCode::BAD_REQUEST,
            Self::Upload(e) => e.status_code(),
            Self::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::NoFile => ErrorResponse::new("No file uploaded"),
            ApiError::Upload(e @ UploadError::FileTooLarge { .. }) => {
                ErrorResponse::with_details("File too large", e.to_string())
            }
            ApiError::Upload(e @ UploadError::Multipart(_)) => {
                ErrorResponse::with_details("Invalid upload", e.to_string())
            }
            ApiError::Upload(e @ UploadError::StorageError(_)) => {
                tracing::error!("Upload error: {}", e);
                ErrorResponse::with_details("Upload failed", e.to_string())
            }
            ApiError::Pipeline(e) => {
                tracing::error!("OCR Error: {}", e);
                ErrorResponse::with_details("OCR failed", e.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}
