//! Configuration management for the OCR highlight server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default upload limit: 10MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default retention sweep period: 5 minutes
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Transient storage root for uploads and highlighted images
    pub upload_dir: PathBuf,
    /// Static assets served at `/`
    pub public_dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_file_size: u64,
    /// Delete the uploaded file when OCR or rendering fails
    pub cleanup_failed_uploads: bool,
    /// Age after which highlighted images are swept (None keeps them forever)
    pub highlight_retention: Option<Duration>,
    /// How often the retention sweep runs
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code
    pub language: String,
    /// Tesseract executable used by the command-line engine
    pub tesseract_cmd: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                public_dir: PathBuf::from("public"),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                cleanup_failed_uploads: false,
                highlight_retention: None,
                sweep_interval: DEFAULT_SWEEP_INTERVAL,
            },
            ocr: OcrConfig {
                language: "eng".to_string(),
                tesseract_cmd: "tesseract".to_string(),
            },
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: parse_var("PORT", defaults.server.port),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                public_dir: env::var("PUBLIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.public_dir),
                max_file_size: parse_var("MAX_UPLOAD_BYTES", defaults.storage.max_file_size),
                cleanup_failed_uploads: parse_var(
                    "CLEANUP_FAILED_UPLOADS",
                    defaults.storage.cleanup_failed_uploads,
                ),
                highlight_retention: env::var("HIGHLIGHT_RETENTION_SECS")
                    .ok()
                    .and_then(|raw| parse_value("HIGHLIGHT_RETENTION_SECS", &raw))
                    .map(Duration::from_secs),
                sweep_interval: env::var("RETENTION_SWEEP_SECS")
                    .ok()
                    .and_then(|raw| parse_sweep_interval(&raw))
                    .unwrap_or(defaults.storage.sweep_interval),
            },
            ocr: OcrConfig {
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
            },
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Ignoring unparsable config value");
            None
        }
    }
}

/// Sweep period in whole seconds; zero is rejected
fn parse_sweep_interval(raw: &str) -> Option<Duration> {
    match parse_value::<u64>("RETENTION_SWEEP_SECS", raw)? {
        0 => {
            tracing::warn!(value = raw, "RETENTION_SWEEP_SECS must be positive, using default");
            None
        }
        secs => Some(Duration::from_secs(secs)),
    }
}
