//! Input normalization for dropped, pasted, and uploaded images.
//!
//! A [`Payload`] is the ordered list of items produced by one user
//! interaction. [`Normalizer::normalize`] turns it into a single
//! [`ImageBytes`] buffer, or `None` when nothing in it is a usable image.

pub mod data_url;
pub mod item;
pub mod normalize;
pub mod sources;

// Re-exports for convenience
pub use data_url::{DataUrl, DataUrlDecoder, InlineDataUrlDecoder, encode_data_url};
pub use item::{FileSource, Item, Payload, StringItem, StringSource};
pub use normalize::Normalizer;
pub use sources::{LiteralString, MemoryFile, PathFile};

/// MIME type of the string item the normalizer looks for.
pub const URI_LIST: &str = "text/uri-list";

/// Prefix marking an inline data URL.
pub const DATA_URL_PREFIX: &str = "data:";

/// Opaque image buffer produced by normalization.
///
/// Nothing about its contents is interpreted here; decoding happens later.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageBytes(Vec<u8>);

impl ImageBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ImageBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ImageBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Errors raised while decoding a data URL.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a data URL (missing \"data:\" prefix)")]
    NotDataUrl,

    #[error("malformed data URL: no ',' separating header and body")]
    MissingComma,

    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors that abort a normalization.
///
/// "No usable image" is not an error; it is reported as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("failed to read item: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode data URL: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type alias for normalization.
pub type Result<T> = std::result::Result<T, NormalizeError>;
