//! Static file serving
//!
//! Transient storage under `/uploads`, public assets everywhere else.

use std::path::Path;

use tower_http::services::ServeDir;

/// Read-only view of the transient storage root
pub fn uploads_service(root: &Path) -> ServeDir {
    ServeDir::new(root)
}

/// Public asset directory served at `/`
pub fn public_service(root: &Path) -> ServeDir {
    ServeDir::new(root).append_index_html_on_directories(true)
}
