//! Route modules for the OCR highlight server

pub mod files;
pub mod health;
pub mod ocr;
