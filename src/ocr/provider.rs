//! OCR Providers
//!
//! Defines the engine trait and the Tesseract backends.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;

use super::tsv::parse_words;
use super::types::{OcrError, OcrWord};

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs
    fn name(&self) -> &'static str;

    /// Recognize every word in the image at `image_path`
    async fn recognize(&self, image_path: &Path) -> Result<Vec<OcrWord>, OcrError>;
}

/// Tesseract via its command-line interface
///
/// Each call runs `tesseract <image> stdout -l <lang> tsv`. The child is
/// killed if the future is dropped before it exits.
pub struct TesseractCli {
    command: String,
    language: String,
}

impl TesseractCli {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract-cli"
    }

    async fn recognize(&self, image_path: &Path) -> Result<Vec<OcrWord>, OcrError> {
        let output = tokio::process::Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("tsv")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_words(&String::from_utf8_lossy(&output.stdout))
    }
}

/// In-process libtesseract
///
/// A fresh engine is created per call on a blocking thread and dropped when
/// the closure returns, whichever way it returns.
#[cfg(feature = "ocr-tesseract")]
pub struct TesseractLib {
    language: String,
}

#[cfg(feature = "ocr-tesseract")]
impl TesseractLib {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

#[cfg(feature = "ocr-tesseract")]
#[async_trait]
impl OcrEngine for TesseractLib {
    fn name(&self) -> &'static str {
        "tesseract-lib"
    }

    async fn recognize(&self, image_path: &Path) -> Result<Vec<OcrWord>, OcrError> {
        let path = image_path
            .to_str()
            .ok_or_else(|| OcrError::ProcessingError(format!("Non UTF-8 path: {}", image_path.display())))?
            .to_string();
        let language = self.language.clone();

        tokio::task::spawn_blocking(move || {
            let mut engine = tesseract::Tesseract::new(None, Some(language.as_str()))
                .map_err(|e| OcrError::Initialization(e.to_string()))?
                .set_image(path.as_str())
                .map_err(|e| OcrError::ProcessingError(e.to_string()))?
                .recognize()
                .map_err(|e| OcrError::ProcessingError(e.to_string()))?;

            let tsv = engine
                .get_tsv_text(0)
                .map_err(|e| OcrError::ProcessingError(e.to_string()))?;

            parse_words(&tsv)
        })
        .await
        .map_err(|e| OcrError::ProcessingError(format!("Task join error: {}", e)))?
    }
}

/// Engine returning canned results for tests
#[cfg(test)]
pub struct MockEngine {
    pub response: Result<Vec<OcrWord>, String>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockEngine {
    pub fn with_words(words: Vec<OcrWord>) -> Self {
        Self {
            response: Ok(words),
            calls: Default::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Default::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, _image_path: &Path) -> Result<Vec<OcrWord>, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response
            .clone()
            .map_err(OcrError::ProcessingError)
    }
}
