//! OCR Types
//!
//! Word-level recognition results and OCR errors.

use serde::{Deserialize, Serialize};

/// Axis-aligned word box in source-image pixels.
///
/// `x0 <= x1` and `y0 <= y1` are expected but not enforced; engines are
/// trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from the left/top/width/height form engines report
    pub fn from_ltwh(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            x0: left,
            y0: top,
            x1: left.saturating_add(width),
            y1: top.saturating_add(height),
        }
    }

    /// Ordered corners and an extent of at least one pixel per axis.
    ///
    /// Zero-width or zero-height boxes are padded to 1 px, so they still
    /// produce a visible mark instead of vanishing.
    pub fn normalized(&self) -> (i32, i32, u32, u32) {
        let left = self.x0.min(self.x1);
        let top = self.y0.min(self.y1);
        let width = self.x0.abs_diff(self.x1).max(1);
        let height = self.y0.abs_diff(self.y1).max(1);
        (left, top, width, height)
    }
}

/// Single recognized word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    /// Word text (may be empty)
    pub text: String,
    /// Engine-native confidence, not normalized
    pub confidence: f64,
    pub bbox: BoundingBox,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to start OCR engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine initialization failed: {0}")]
    Initialization(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Malformed OCR output at line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },
}
