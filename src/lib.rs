//! OCR Highlight Server Library
//!
//! Upload an image, get back every recognized word with its bounding box
//! and a copy of the image with each word highlighted.
//!
//! # Modules
//!
//! - `upload`: multipart upload into transient storage
//! - `ocr`: word-level recognition through Tesseract
//! - `highlight`: rectangle drawing and PNG output
//! - `pipeline`: OCR followed by rendering for one stored image
//! - `routes`: HTTP handlers and static file services

pub mod config;
pub mod error;
pub mod highlight;
pub mod ocr;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = routes::files::uploads_service(state.storage().root());
    let public = routes::files::public_service(&state.config().storage.public_dir);
    let max_file_size = state.config().storage.max_file_size;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", routes::ocr::router(max_file_size))
        .nest_service(storage::URL_PREFIX, uploads)
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
