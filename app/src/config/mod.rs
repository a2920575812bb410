//! Configuration management: defaults, validation, loading from environment.

pub mod app_config;
pub mod defaults;
pub mod validation;

use std::path::PathBuf;

pub use app_config::AppConfig;

/// Determine the data directory for the application.
/// Priority: YELLS_AT_DATA_DIR env var > <platform data dir>/yells-at > .
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("YELLS_AT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("yells-at"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}
