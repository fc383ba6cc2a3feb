//! Upload types

use std::path::PathBuf;

use axum::http::StatusCode;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Allowance for multipart framing on top of the file size limit
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// A received upload sitting in transient storage
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub original_name: String,
    /// Assigned storage path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Declared content type (informational only)
    pub content_type: Option<String>,
}

/// Upload error types
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: u64 },

    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Failed to store upload: {0}")]
    StorageError(#[from] std::io::Error),
}

impl UploadError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
