use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, Blend};
use imageproc::rect::Rect;

use crate::ocr::{BoundingBox, OcrWord};
use crate::storage::TransientStorage;

/// Lime
pub const HIGHLIGHT_COLOR: [u8; 3] = [0, 255, 0];

/// ~15% opacity
pub const FILL_ALPHA: u8 = 38;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode highlighted image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to write highlighted image: {0}")]
    Write(#[from] std::io::Error),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// Render highlights for `words` over the image at `image_path`.
///
/// Returns the path of the new PNG. Nothing is written unless decoding and
/// encoding both succeed.
pub async fn render(
    storage: &TransientStorage,
    image_path: &Path,
    words: &[OcrWord],
) -> Result<PathBuf, RenderError> {
    let storage = storage.clone();
    let source = image_path.to_path_buf();
    let boxes: Vec<BoundingBox> = words.iter().map(|word| word.bbox).collect();

    tokio::task::spawn_blocking(move || {
        let image = image::open(&source).map_err(|e| RenderError::Decode {
            path: source.clone(),
            source: e,
        })?;

        let surface = highlight_boxes(image.to_rgba8(), &boxes);

        let mut png = Vec::new();
        surface
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(RenderError::Encode)?;

        let (path, mut file) = storage.reserve_highlight()?;
        if let Err(e) = file.write_all(&png).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(RenderError::Write(e));
        }

        tracing::debug!(
            path = %path.display(),
            width = surface.width(),
            height = surface.height(),
            boxes = boxes.len(),
            "Highlighted image written"
        );

        Ok(path)
    })
    .await
    .map_err(|e| RenderError::Task(format!("Task join error: {}", e)))?
}

/// Composite one highlight per box, in order, over `surface`.
///
/// Each box gets a 2px opaque stroke centered on its edges followed by a
/// translucent fill, so later boxes blend over earlier ones.
pub fn highlight_boxes(surface: RgbaImage, boxes: &[BoundingBox]) -> RgbaImage {
    let [r, g, b] = HIGHLIGHT_COLOR;
    let stroke = Rgba([r, g, b, u8::MAX]);
    let fill = Rgba([r, g, b, FILL_ALPHA]);
    let (width, height) = surface.dimensions();

    let mut canvas = Blend(surface);
    for bbox in boxes {
        let Some(inner) = clip_to_canvas(bbox, width, height) else {
            continue;
        };
        // Outer ring sits one pixel outside the edge, inner ring on it
        let outer = Rect::at(inner.left() - 1, inner.top() - 1)
            .of_size(inner.width() + 2, inner.height() + 2);

        draw_hollow_rect_mut(&mut canvas, outer, stroke);
        draw_hollow_rect_mut(&mut canvas, inner, stroke);
        draw_filled_rect_mut(&mut canvas, inner, fill);
    }

    canvas.0
}

/// Box as a drawable rect, trimmed to one pixel beyond the canvas.
///
/// `None` when neither ring nor fill would touch a visible pixel.
fn clip_to_canvas(bbox: &BoundingBox, width: u32, height: u32) -> Option<Rect> {
    let (left, top, box_width, box_height) = bbox.normalized();
    let (left, top) = (i64::from(left), i64::from(top));
    let (right, bottom) = (left + i64::from(box_width), top + i64::from(box_height));
    let (width, height) = (i64::from(width), i64::from(height));

    if right < 0 || bottom < 0 || left > width || top > height {
        return None;
    }

    let (left, top) = (left.max(-1), top.max(-1));
    let (right, bottom) = (right.min(width + 1), bottom.min(height + 1));

    Some(
        Rect::at(left as i32, top as i32)
            .of_size((right - left).max(1) as u32, (bottom - top).max(1) as u32),
    )
}
