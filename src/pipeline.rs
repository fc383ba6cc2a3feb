//! OCR + highlight pipeline for one stored image

use std::path::{Path, PathBuf};

use crate::highlight::{self, RenderError};
use crate::ocr::{OcrEngine, OcrError, OcrWord};
use crate::storage::TransientStorage;

/// Failure of either stage. No partial output survives a failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Words in the order their highlights were drawn
    pub words: Vec<OcrWord>,
    /// Path of the generated image
    pub highlighted: PathBuf,
}

/// Recognize, then render highlights over the same image
pub async fn run(
    engine: &dyn OcrEngine,
    storage: &TransientStorage,
    image_path: &Path,
) -> Result<PipelineOutput, PipelineError> {
    let words = engine.recognize(image_path).await?;
    tracing::debug!(engine = engine.name(), words = words.len(), "Recognition complete");

    let highlighted = highlight::render(storage, image_path, &words).await?;

    Ok(PipelineOutput { words, highlighted })
}
