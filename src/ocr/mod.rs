//! OCR Module
//!
//! Word-level text recognition over a stored image.
//!
//! Backends:
//! - Tesseract command-line engine (default)
//! - In-process libtesseract (`ocr-tesseract` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_highlight_server::ocr::{OcrEngine, TesseractCli};
//!
//! let engine = TesseractCli::new("tesseract", "eng");
//! let words = engine.recognize(Path::new("uploads/1700000000000-scan.png")).await?;
//! ```

mod provider;
mod tsv;
mod types;

use std::sync::Arc;

use crate::config::OcrConfig;

pub use provider::{OcrEngine, TesseractCli};
pub use tsv::parse_words;
pub use types::{BoundingBox, OcrError, OcrWord};

#[cfg(feature = "ocr-tesseract")]
pub use provider::TesseractLib;

#[cfg(test)]
pub use provider::MockEngine;

/// Build the engine selected at compile time
#[cfg(not(feature = "ocr-tesseract"))]
pub fn engine_from_config(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    Arc::new(TesseractCli::new(&config.tesseract_cmd, &config.language))
}

/// Build the engine selected at compile time
#[cfg(feature = "ocr-tesseract")]
pub fn engine_from_config(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    Arc::new(TesseractLib::new(&config.language))
}
