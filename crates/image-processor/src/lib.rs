//! Image processing for template compositing.
//!
//! Provides aspect-preserving resizing, alpha overlay, template
//! composition, output encoding, and a per-resource asset cache.

pub mod cache;
pub mod compose;
pub mod encode;
pub mod resize;
pub mod template;

// Re-exports for convenience
pub use cache::AssetCache;
pub use compose::overlay;
pub use encode::{OutputFormat, encode};
pub use resize::{Geometry, resize_to_fit, resize_to_height, resize_to_width};
pub use template::{Offset, TemplateLayout, compose_on_template};

/// Errors that can occur while compositing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {format} output: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type alias for image-processor operations.
pub type Result<T> = std::result::Result<T, ProcessError>;
