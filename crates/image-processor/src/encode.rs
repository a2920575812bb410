//! Output encoding for composited images.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ProcessError, Result};

/// Encoded format of the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    Webp,
}

impl OutputFormat {
    pub const ALL: &[OutputFormat] = &[
        Self::Png,
        Self::Jpeg,
        Self::Bmp,
        Self::Gif,
        Self::Tiff,
        Self::Webp,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }

    /// Whether the format stores an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg | Self::Bmp)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = ProcessError;

    /// Accepts a format name, a file extension, or a MIME type.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        let name = lower.strip_prefix("image/").unwrap_or(&lower);
        match name {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "gif" => Ok(Self::Gif),
            "tiff" | "tif" => Ok(Self::Tiff),
            "webp" => Ok(Self::Webp),
            _ => Err(ProcessError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Encode an image into `format`.
///
/// Formats without alpha receive an RGB conversion first.
pub fn encode(img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());

    let converted;
    let target = if format.supports_alpha() {
        img
    } else {
        converted = DynamicImage::ImageRgb8(img.to_rgb8());
        &converted
    };

    target
        .write_to(&mut cursor, format.image_format())
        .map_err(|source| ProcessError::Encode { format, source })?;

    let bytes = cursor.into_inner();
    debug!(%format, len = bytes.len(), "Encoded output image");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 4, Rgba([10, 200, 30, 180])))
    }

    #[test]
    fn parses_names_extensions_and_mime_types() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!(".JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(
            "image/webp".parse::<OutputFormat>().unwrap(),
            OutputFormat::Webp
        );
        assert!("psd".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), *format);
        }
    }

    #[test]
    fn png_output_keeps_alpha() {
        let bytes = encode(&sample(), OutputFormat::Png).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 180);
    }

    #[test]
    fn every_format_encodes_and_is_detected() {
        for format in OutputFormat::ALL {
            let bytes = encode(&sample(), *format).unwrap();
            let guessed = image::guess_format(&bytes).unwrap();
            assert_eq!(guessed, format.image_format(), "format {format}");
        }
    }

    #[test]
    fn jpeg_mime_and_extension() {
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert!(!OutputFormat::Jpeg.supports_alpha());
    }
}
