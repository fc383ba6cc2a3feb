//! Transient Storage
//!
//! A single flat directory holding pending uploads and generated
//! highlighted images. Names are derived from millisecond timestamps:
//!
//! - uploads: `<millis>-<original file name>`
//! - outputs: `highlighted-<millis>.png`
//!
//! Everything in the root is exposed read-only under [`URL_PREFIX`].

mod retention;

pub use retention::RetentionPolicy;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

/// URL prefix under which the storage root is served
pub const URL_PREFIX: &str = "/uploads";

/// File name prefix of generated images
pub const HIGHLIGHT_PREFIX: &str = "highlighted-";

/// Name used when the client sends no file name
const FALLBACK_FILE_NAME: &str = "upload";

#[derive(Debug, Clone)]
pub struct TransientStorage {
    root: PathBuf,
}

impl TransientStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Path for a newly received upload.
    ///
    /// Two uploads with the same name in the same millisecond map to the
    /// same path; the later one overwrites the earlier.
    pub fn upload_path(&self, original_name: &str) -> PathBuf {
        self.root.join(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        ))
    }

    /// Atomically claim a fresh `highlighted-<millis>.png` path.
    ///
    /// Blocking; call from a blocking task. When the current millisecond is
    /// already taken the suffix is advanced until an unused name is found.
    pub fn reserve_highlight(&self) -> io::Result<(PathBuf, File)> {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let path = self.root.join(format!("{}{}.png", HIGHLIGHT_PREFIX, millis));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Public URL of a file stored in the root
    pub fn url_for(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        format!("{}/{}", URL_PREFIX, name)
    }

    /// Best-effort removal; a file that is already gone is not an error
    pub async fn remove(&self, path: &Path) -> io::Result<()> {
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Keep only the final path component of a client-supplied file name
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        base.to_string()
    }
}
