//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{self, OcrEngine};
use crate::storage::TransientStorage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    storage: TransientStorage,
    ocr: Arc<dyn OcrEngine>,
}

impl AppState {
    /// Create state around an explicit OCR engine
    pub fn new(config: Config, ocr: Arc<dyn OcrEngine>) -> Self {
        let storage = TransientStorage::new(config.storage.upload_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                ocr,
            }),
        }
    }

    /// Create state with the engine selected by `config`
    pub fn from_config(config: Config) -> Self {
        let ocr = ocr::engine_from_config(&config.ocr);
        Self::new(config, ocr)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the transient storage
    pub fn storage(&self) -> &TransientStorage {
        &self.inner.storage
    }

    /// Get the OCR engine
    pub fn ocr(&self) -> &dyn OcrEngine {
        self.inner.ocr.as_ref()
    }
}
