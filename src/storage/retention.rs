//! Retention sweep for generated images

use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use super::{TransientStorage, HIGHLIGHT_PREFIX};
use crate::config::{StorageConfig, DEFAULT_SWEEP_INTERVAL};

/// Deletes highlighted images older than `max_age`
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub interval: Duration,
}

impl RetentionPolicy {
    /// Returns `None` when no retention window is configured.
    ///
    /// A zero sweep interval falls back to [`DEFAULT_SWEEP_INTERVAL`].
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        config.highlight_retention.map(|max_age| Self {
            max_age,
            interval: sweep_period(config.sweep_interval),
        })
    }

    /// Remove expired highlighted images
    ///
    /// Returns the number of files removed. Uploads are never touched.
    pub async fn sweep(&self, storage: &TransientStorage) -> io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(storage.root()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let is_highlight = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(HIGHLIGHT_PREFIX));
            if !is_highlight {
                continue;
            }

            let path = entry.path();
            let Some(modified) = modified_at(&path).await? else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age >= self.max_age {
                storage.remove(&path).await?;
                tracing::debug!(path = %path.display(), "Removed expired highlighted image");
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Start background sweep task
    pub fn start_sweep_task(self, storage: TransientStorage) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_period(self.interval));

            loop {
                interval.tick().await;
                match self.sweep(&storage).await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "Retention sweep removed highlighted images"),
                    Err(e) => tracing::warn!("Retention sweep failed: {}", e),
                }
            }
        })
    }
}

fn sweep_period(interval: Duration) -> Duration {
    if interval.is_zero() {
        tracing::warn!("Retention sweep interval is zero, using {:?}", DEFAULT_SWEEP_INTERVAL);
        DEFAULT_SWEEP_INTERVAL
    } else {
        interval
    }
}

/// Modification time, or `None` if the file vanished since it was listed
async fn modified_at(path: &Path) -> io::Result<Option<SystemTime>> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
