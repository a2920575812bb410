//! System clipboard access for the paste interaction.
//!
//! The clipboard is read once into a [`ClipboardSnapshot`], which is then
//! mapped onto a [`Payload`] the same way a browser exposes a paste event:
//! text becomes `text/plain` (plus `text/uri-list` when every line is a URI)
//! and a bitmap becomes a PNG file item.

use chrono::{DateTime, Local};
use image::{DynamicImage, RgbaImage};
use image_processor::{OutputFormat, encode};
use input_normalizer::{Item, LiteralString, MemoryFile, Payload, URI_LIST};

/// Raw bitmap read from the clipboard.
#[derive(Debug, Clone)]
pub struct ClipboardImage {
    pub width: usize,
    pub height: usize,
    /// RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
}

/// Everything the paste interaction looks at.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSnapshot {
    pub text: Option<String>,
    pub image: Option<ClipboardImage>,
}

/// Error types for clipboard operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard access error: {0}")]
    AccessError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

/// Trait for clipboard access, enabling mock implementations for testing.
pub trait ClipboardProvider {
    /// Read the current text and image contents.
    ///
    /// Missing content is `None`, not an error.
    fn snapshot(&self) -> Result<ClipboardSnapshot, ClipboardError>;
}

/// System clipboard implementation using the `arboard` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn snapshot(&self) -> Result<ClipboardSnapshot, ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))?;

        let text = match clipboard.get_text() {
            Ok(text) => Some(text),
            Err(arboard::Error::ContentNotAvailable) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Clipboard text unavailable");
                None
            }
        };

        let image = match clipboard.get_image() {
            Ok(data) => Some(ClipboardImage {
                width: data.width,
                height: data.height,
                rgba: data.bytes.into_owned(),
            }),
            Err(arboard::Error::ContentNotAvailable) => None,
            Err(e) => return Err(ClipboardError::AccessError(e.to_string())),
        };

        Ok(ClipboardSnapshot { text, image })
    }
}

/// Map a clipboard snapshot onto a paste payload.
pub fn snapshot_to_payload(
    snapshot: ClipboardSnapshot,
    now: DateTime<Local>,
) -> Result<Payload, ClipboardError> {
    let mut payload = Payload::new();

    if let Some(text) = snapshot.text.filter(|t| !t.is_empty()) {
        if is_uri_list(&text) {
            payload.push(Item::string(URI_LIST, LiteralString::new(text.clone())));
        }
        payload.push(Item::string("text/plain", LiteralString::new(text)));
    }

    if let Some(image) = snapshot.image {
        let png = encode_rgba_to_png(&image)?;
        let filename = format!("clipboard_{}.png", now.format("%Y%m%d_%H%M%S"));
        payload.push(Item::file(MemoryFile::named(filename, png)));
    }

    tracing::debug!(items = payload.len(), "Clipboard payload built");
    Ok(payload)
}

/// Whether `text` is a `text/uri-list` body: one absolute URI per line,
/// `#` lines are comments.
pub fn is_uri_list(text: &str) -> bool {
    let mut uris = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .peekable();

    uris.peek().is_some() && uris.all(|line| url::Url::parse(line).is_ok())
}

fn encode_rgba_to_png(image: &ClipboardImage) -> Result<Vec<u8>, ClipboardError> {
    let buffer = RgbaImage::from_raw(image.width as u32, image.height as u32, image.rgba.clone())
        .ok_or_else(|| ClipboardError::ImageError("Invalid image dimensions".to_owned()))?;

    encode(&DynamicImage::ImageRgba8(buffer), OutputFormat::Png)
        .map_err(|e| ClipboardError::ImageError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_normalizer::Normalizer;

    fn snapshot(text: Option<&str>, image: Option<ClipboardImage>) -> ClipboardSnapshot {
        ClipboardSnapshot {
            text: text.map(str::to_string),
            image,
        }
    }

    fn pixel() -> ClipboardImage {
        ClipboardImage {
            width: 1,
            height: 1,
            rgba: vec![255, 0, 0, 255],
        }
    }

    #[test]
    fn uri_list_detection() {
        assert!(is_uri_list("data:image/png;base64,AAAA"));
        assert!(is_uri_list("# comment\nhttps://example.com/a.png\nfile:///tmp/b.png"));
        assert!(!is_uri_list("hello world"));
        assert!(!is_uri_list("https://example.com\nnot a uri"));
        assert!(!is_uri_list("# only a comment"));
        assert!(!is_uri_list(""));
    }

    #[test]
    fn empty_clipboard_gives_empty_payload() {
        let payload = snapshot_to_payload(snapshot(None, None), Local::now()).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn plain_text_maps_to_text_plain_only() {
        let payload = snapshot_to_payload(snapshot(Some("hello"), None), Local::now()).unwrap();
        assert_eq!(payload.len(), 1);
        assert!(payload.first_string_of("text/plain").is_some());
        assert!(payload.first_string_of(URI_LIST).is_none());
    }

    #[test]
    fn data_url_text_also_maps_to_uri_list() {
        let payload = snapshot_to_payload(
            snapshot(Some("data:image/png;base64,AAAA"), None),
            Local::now(),
        )
        .unwrap();
        assert_eq!(payload.len(), 2);
        assert!(payload.first_string_of(URI_LIST).is_some());
    }

    #[test]
    fn bitmap_becomes_named_png_file() {
        let now = Local::now();
        let payload = snapshot_to_payload(snapshot(Some("caption"), Some(pixel())), now).unwrap();
        assert_eq!(payload.len(), 2);
        let expected = format!("clipboard_{}.png", now.format("%Y%m%d_%H%M%S"));
        assert_eq!(payload.file_name(), Some(expected.as_str()));
    }

    #[test]
    fn mismatched_bitmap_size_is_an_error() {
        let broken = ClipboardImage {
            width: 4,
            height: 4,
            rgba: vec![0; 3],
        };
        let err = snapshot_to_payload(snapshot(None, Some(broken)), Local::now()).unwrap_err();
        assert!(matches!(err, ClipboardError::ImageError(_)));
    }

    #[tokio::test]
    async fn pasted_bitmap_normalizes_to_png_bytes() {
        let payload = snapshot_to_payload(snapshot(None, Some(pixel())), Local::now()).unwrap();
        let normalizer: Normalizer = Normalizer::default();
        let bytes = normalizer.normalize(&payload).await.unwrap().unwrap();

        let decoded = image::load_from_memory(bytes.as_slice()).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
