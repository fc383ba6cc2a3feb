//! Upload Receiver
//!
//! Streams the `file` field of a multipart body into transient storage.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;

use super::types::{UploadError, UploadedFile, FILE_FIELD};
use crate::storage::TransientStorage;

/// Store the first `file` field of `multipart`.
///
/// Returns `Ok(None)` when the body has no such field; nothing is written in
/// that case. Other fields, and a `file` field sent without a filename
/// (plain form value rather than a file part), are skipped.
pub async fn receive_file(
    multipart: &mut Multipart,
    storage: &TransientStorage,
    max_size: u64,
) -> Result<Option<UploadedFile>, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != FILE_FIELD {
            tracing::debug!(field = %name, "Skipping multipart field");
            continue;
        }

        let Some(original_name) = field.file_name().map(str::to_string) else {
            tracing::debug!("Skipping `{}` field without a filename", FILE_FIELD);
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());

        storage.ensure_root().await?;
        let path = storage.upload_path(&original_name);

        let size = match write_field(field, &path, max_size).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(remove_error) = storage.remove(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        "Failed to remove partial upload: {}",
                        remove_error
                    );
                }
                return Err(e);
            }
        };

        tracing::debug!(
            path = %path.display(),
            original_name = %original_name,
            size,
            "Upload stored"
        );

        return Ok(Some(UploadedFile {
            original_name,
            path,
            size,
            content_type,
        }));
    }

    Ok(None)
}

async fn write_field(
    mut field: Field<'_>,
    path: &std::path::Path,
    max_size: u64,
) -> Result<u64, UploadError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        size += chunk.len() as u64;
        if size > max_size {
            return Err(UploadError::FileTooLarge { max: max_size });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(size)
}

/// The body limit layer surfaces as a multipart error with status 413
fn multipart_error(error: MultipartError, max_size: u64) -> UploadError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge { max: max_size }
    } else {
        UploadError::Multipart(error.body_text())
    }
}
