//! Payload normalization: pick one item and turn it into image bytes.

use tracing::debug;

use crate::data_url::{DataUrlDecoder, InlineDataUrlDecoder};
use crate::item::Payload;
use crate::{DATA_URL_PREFIX, ImageBytes, Result, URI_LIST};

/// Extracts image bytes from a payload.
///
/// File items win over string items regardless of position. Without a file,
/// the first `text/uri-list` item is resolved and accepted only when it is an
/// inline data URL; remote URLs are never fetched.
#[derive(Debug, Clone, Default)]
pub struct Normalizer<D = InlineDataUrlDecoder> {
    decoder: D,
}

impl<D: DataUrlDecoder> Normalizer<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Normalize `payload`. `Ok(None)` means nothing usable was found.
    pub async fn normalize(&self, payload: &Payload) -> Result<Option<ImageBytes>> {
        if let Some(file) = payload.first_file() {
            debug!(name = ?file.file_name(), "Normalizing file item");
            let bytes = file.read_bytes().await?;
            return Ok(Some(bytes));
        }

        let Some(item) = payload.first_string_of(URI_LIST) else {
            debug!(items = payload.len(), "No file or uri-list item in payload");
            return Ok(None);
        };

        let value = item.read_string().await?;
        if !value.starts_with(DATA_URL_PREFIX) {
            debug!("uri-list item is not a data URL, ignoring");
            return Ok(None);
        }

        let bytes = self.decoder.decode(&value).await?;
        debug!(len = bytes.len(), "Normalized data URL item");
        Ok(Some(bytes))
    }
}
