//! Highlight rendering
//!
//! Draws a border and a translucent fill over every recognized word and
//! stores the result as a PNG in transient storage.

mod renderer;

pub use renderer::{highlight_boxes, render, RenderError, FILL_ALPHA, HIGHLIGHT_COLOR};
