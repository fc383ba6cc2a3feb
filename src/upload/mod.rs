//! Upload Module
//!
//! Receives a single multipart image upload into transient storage.

mod receiver;
mod types;

pub use receiver::receive_file;
pub use types::{UploadError, UploadedFile, FILE_FIELD, MULTIPART_OVERHEAD};
