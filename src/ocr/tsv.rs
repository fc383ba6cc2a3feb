//! Tesseract TSV output parsing
//!
//! Columns: `level page_num block_num par_num line_num word_num left top
//! width height conf text`. Only level 5 rows are words.

use super::types::{BoundingBox, OcrError, OcrWord};

const WORD_LEVEL: &str = "5";
const COLUMN_COUNT: usize = 12;

/// Extract word results in the engine's reading order
pub fn parse_words(tsv: &str) -> Result<Vec<OcrWord>, OcrError> {
    let mut words = Vec::new();

    for (index, line) in tsv.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with("level") {
            continue;
        }

        let columns: Vec<&str> = line.splitn(COLUMN_COUNT, '\t').collect();
        if columns[0] != WORD_LEVEL {
            continue;
        }
        // An empty word can drop the trailing text column entirely
        if columns.len() < COLUMN_COUNT - 1 {
            return Err(OcrError::MalformedOutput {
                line: line_number,
                reason: format!("expected {} columns, found {}", COLUMN_COUNT, columns.len()),
            });
        }

        let int = |column: usize, name: &str| -> Result<i32, OcrError> {
            columns[column].trim().parse().map_err(|_| OcrError::MalformedOutput {
                line: line_number,
                reason: format!("invalid {}: {:?}", name, columns[column]),
            })
        };

        let left = int(6, "left")?;
        let top = int(7, "top")?;
        let width = int(8, "width")?;
        let height = int(9, "height")?;
        let confidence: f64 = columns[10].trim().parse().map_err(|_| OcrError::MalformedOutput {
            line: line_number,
            reason: format!("invalid conf: {:?}", columns[10]),
        })?;
        let text = columns.get(11).copied().unwrap_or("");

        words.push(OcrWord {
            text: text.to_string(),
            confidence,
            bbox: BoundingBox::from_ltwh(left, top, width, height),
        });
    }

    Ok(words)
}
