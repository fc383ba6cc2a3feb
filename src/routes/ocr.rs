//! OCR Routes
//!
//! Endpoints:
//! - POST /api/ocr - Upload an image, recognize words, render highlights

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::ocr::OcrWord;
use crate::pipeline;
use crate::state::AppState;
use crate::storage::TransientStorage;
use crate::upload::{receive_file, UploadedFile, MULTIPART_OVERHEAD};

/// Successful OCR response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    pub success: bool,
    pub total_words: usize,
    pub results: Vec<OcrWord>,
    /// URL path of the highlighted image
    pub highlighted_image: String,
}

/// Create the OCR router
pub fn router(max_file_size: u64) -> Router<AppState> {
    let body_limit =
        usize::try_from(max_file_size.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX);

    Router::new()
        .route("/ocr", post(recognize_upload))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// POST /api/ocr
///
/// Multipart body with a single `file` field. The upload is deleted once the
/// highlighted image exists; the highlighted image itself is kept.
async fn recognize_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!("Rejected non-multipart OCR request: {}", rejection);
            return Err(ApiError::NoFile);
        }
    };

    let storage = state.storage();
    let upload = receive_file(&mut multipart, storage, state.config().storage.max_file_size)
        .await?
        .ok_or(ApiError::NoFile)?;

    tracing::info!(
        file_name = %upload.original_name,
        size = upload.size,
        content_type = ?upload.content_type,
        "Processing OCR upload"
    );

    let output = match pipeline::run(state.ocr(), storage, &upload.path).await {
        Ok(output) => output,
        Err(e) => {
            if state.config().storage.cleanup_failed_uploads {
                discard_upload(storage, &upload).await;
            }
            return Err(e.into());
        }
    };

    discard_upload(storage, &upload).await;

    let highlighted_image = storage.url_for(&output.highlighted);
    tracing::info!(
        file_name = %upload.original_name,
        total_words = output.words.len(),
        highlighted_image = %highlighted_image,
        "OCR complete"
    );

    Ok(Json(OcrResponse {
        success: true,
        total_words: output.words.len(),
        results: output.words,
        highlighted_image,
    }))
}

async fn discard_upload(storage: &TransientStorage, upload: &UploadedFile) {
    if let Err(e) = storage.remove(&upload.path).await {
        tracing::warn!(path = %upload.path.display(), "Failed to remove upload: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ocr::{BoundingBox, MockEngine, OcrEngine, OcrError};

    const BOUNDARY: &str = "ocr-test-boundary";

    fn test_app(dir: &Path, engine: Arc<dyn OcrEngine>, tweak: impl FnOnce(&mut Config)) -> Router {
        let mut config = Config::default();
        config.storage.upload_dir = dir.join("uploads");
        config.storage.public_dir = dir.join("public");
        tweak(&mut config);
        crate::router(AppState::new(config, engine))
    }

    fn multipart_request(field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/ocr")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn sample_words() -> Vec<OcrWord> {
        vec![
            OcrWord {
                text: "Hello".to_string(),
                confidence: 95.2,
                bbox: BoundingBox::new(2, 2, 20, 10),
            },
            OcrWord {
                text: "world".to_string(),
                confidence: 71.0,
                bbox: BoundingBox::new(24, 2, 40, 10),
            },
        ]
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Reports one word named after the stored file
    struct EchoEngine;

    #[async_trait]
    impl OcrEngine for EchoEngine {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn recognize(&self, image_path: &Path) -> std::result::Result<Vec<OcrWord>, OcrError> {
            let name = image_path.file_name().unwrap().to_string_lossy();
            let (_, original) = name.split_once('-').unwrap();
            let offset = original.len() as i32;
            Ok(vec![OcrWord {
                text: original.to_string(),
                confidence: 50.0,
                bbox: BoundingBox::new(offset, offset, offset + 5, offset + 5),
            }])
        }
    }

    #[tokio::test]
    async fn test_successful_ocr() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |_| {});

        let response = app
            .clone()
            .oneshot(multipart_request("file", "scan.png", &png_bytes(48, 16)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: OcrResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert!(body.success);
        assert_eq!(body.total_words, body.results.len());
        assert_eq!(body.results, sample_words());
        assert!(body.highlighted_image.starts_with("/uploads/highlighted-"));
        assert!(body.highlighted_image.ends_with(".png"));
        assert_eq!(engine.call_count(), 1);

        // Upload removed, highlighted image kept
        let stored = files_in(&temp_dir.path().join("uploads"));
        assert_eq!(stored.len(), 1);
        assert!(stored[0].starts_with("highlighted-"));

        // And it is served back
        let response = app
            .oneshot(
                Request::builder()
                    .uri(body.highlighted_image.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_response_json_shape() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(
            temp_dir.path(),
            Arc::new(MockEngine::with_words(sample_words()[..1].to_vec())),
            |_| {},
        );

        let response = app
            .oneshot(multipart_request("file", "scan.png", &png_bytes(30, 12)))
            .await
            .unwrap();
        let body = json_body(response).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["totalWords"], 1);
        assert_eq!(body["results"][0]["text"], "Hello");
        assert_eq!(body["results"][0]["bbox"]["x1"], 20);
        assert!(body["highlightedImage"].is_string());
    }

    #[tokio::test]
    async fn test_no_text_detected() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), Arc::new(MockEngine::with_words(vec![])), |_| {});
        let source = png_bytes(20, 20);

        let response = app
            .oneshot(multipart_request("file", "blank.png", &source))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: OcrResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(body.total_words, 0);
        assert!(body.results.is_empty());

        let name = body.highlighted_image.trim_start_matches("/uploads/");
        let rendered = image::open(temp_dir.path().join("uploads").join(name)).unwrap();
        assert_eq!(
            rendered.to_rgba8(),
            image::load_from_memory(&source).unwrap().to_rgba8()
        );
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |_| {});

        let response = app
            .oneshot(multipart_request("attachment", "scan.png", &png_bytes(8, 8)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "No file uploaded" })
        );
        assert_eq!(engine.call_count(), 0);
        assert!(!temp_dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_file_field_without_filename() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |_| {});

        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/ocr")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "No file uploaded" })
        );
        assert_eq!(engine.call_count(), 0);
        assert!(files_in(&temp_dir.path().join("uploads")).is_empty());
    }

    #[tokio::test]
    async fn test_non_multipart_request() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |_| {});

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ocr")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file uploaded");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_ocr() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |config| {
            config.storage.max_file_size = 1024;
        });

        let response = app
            .oneshot(multipart_request("file", "huge.png", &vec![0u8; 4096]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"], "File too large");
        assert_eq!(engine.call_count(), 0);
        assert!(files_in(&temp_dir.path().join("uploads")).is_empty());
    }

    #[tokio::test]
    async fn test_body_beyond_transport_limit() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::with_words(sample_words()));
        let app = test_app(temp_dir.path(), engine.clone(), |config| {
            config.storage.max_file_size = 1024;
        });

        let response = app
            .oneshot(multipart_request("file", "huge.png", &vec![7u8; 256 * 1024]))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ocr_failure_keeps_upload() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(
            temp_dir.path(),
            Arc::new(MockEngine::failing("Tesseract exited with 1")),
            |_| {},
        );

        let response = app
            .oneshot(multipart_request("file", "scan.png", &png_bytes(8, 8)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "OCR failed");
        assert!(body["details"].as_str().unwrap().contains("Tesseract exited with 1"));
        assert!(body.get("results").is_none());

        let stored = files_in(&temp_dir.path().join("uploads"));
        assert_eq!(stored.len(), 1);
        assert!(stored[0].ends_with("-scan.png"));
    }

    #[tokio::test]
    async fn test_ocr_failure_with_cleanup_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(
            temp_dir.path(),
            Arc::new(MockEngine::failing("no engine")),
            |config| config.storage.cleanup_failed_uploads = true,
        );

        let response = app
            .oneshot(multipart_request("file", "scan.png", &png_bytes(8, 8)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(files_in(&temp_dir.path().join("uploads")).is_empty());
    }

    #[tokio::test]
    async fn test_non_image_creates_no_highlight() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(
            temp_dir.path(),
            Arc::new(MockEngine::with_words(sample_words())),
            |_| {},
        );

        let response = app
            .oneshot(multipart_request("file", "notes.png", b"%PDF-1.4 definitely not a png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "OCR failed");
        assert!(files_in(&temp_dir.path().join("uploads"))
            .iter()
            .all(|name| !name.starts_with("highlighted-")));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), Arc::new(EchoEngine), |_| {});

        let (first, second) = tokio::join!(
            app.clone()
                .oneshot(multipart_request("file", "alpha.png", &png_bytes(40, 40))),
            app.clone()
                .oneshot(multipart_request("file", "bravo-two.png", &png_bytes(40, 40))),
        );

        let first: OcrResponse =
            serde_json::from_value(json_body(first.unwrap()).await).unwrap();
        let second: OcrResponse =
            serde_json::from_value(json_body(second.unwrap()).await).unwrap();

        assert_eq!(first.results.len(), 1);
        assert_eq!(first.results[0].text, "alpha.png");
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].text, "bravo-two.png");
        assert_ne!(first.highlighted_image, second.highlighted_image);
    }

    #[tokio::test]
    async fn test_serves_uploads_and_health_over_http() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(temp_dir.path(), Arc::new(MockEngine::with_words(vec![])), |_| {});
        let server = axum_test::TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        let health: serde_json::Value = response.json();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["service"], "ocr-highlight-server");

        let response = server.get("/uploads/highlighted-0.png").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
