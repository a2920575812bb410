//! Inline `data:` URL decoding and encoding.
//!
//! Follows RFC 2397: `data:[<mediatype>][;base64],<data>`. The body is
//! percent-decoded first; base64 bodies tolerate whitespace, missing
//! padding and non-zero trailing bits.

use std::borrow::Cow;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use futures::future::BoxFuture;
use tracing::debug;

use crate::{DATA_URL_PREFIX, DecodeError, ImageBytes};

/// Media type assumed when a data URL omits one.
pub const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

static LENIENT_BASE64: LazyLock<GeneralPurpose> = LazyLock::new(|| {
    GeneralPurpose::new(
        &base64::alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_decode_padding_mode(DecodePaddingMode::Indifferent)
            .with_decode_allow_trailing_bits(true),
    )
});

/// A parsed data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: String,
    pub base64: bool,
    pub body: Vec<u8>,
}

impl DataUrl {
    /// Parse and decode a data URL.
    pub fn parse(url: &str) -> Result<Self, DecodeError> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or(DecodeError::NotDataUrl)?;
        let (header, body) = rest.split_once(',').ok_or(DecodeError::MissingComma)?;

        let (media_type, base64) = match header.rsplit_once(';') {
            Some((mt, param)) if param.trim().eq_ignore_ascii_case("base64") => (mt, true),
            _ => (header, false),
        };
        let media_type = match media_type.trim() {
            "" => DEFAULT_MEDIA_TYPE.to_string(),
            mt if mt.starts_with(';') => format!("text/plain{mt}"),
            mt => mt.to_string(),
        };

        let percent_decoded = urlencoding::decode_binary(body.as_bytes());
        let body = if base64 {
            let compact: Vec<u8> = percent_decoded
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            LENIENT_BASE64.decode(compact)?
        } else {
            Cow::into_owned(percent_decoded)
        };

        debug!(
            media_type = %media_type,
            base64,
            len = body.len(),
            "Decoded data URL"
        );

        Ok(Self {
            media_type,
            base64,
            body,
        })
    }
}

/// Async capability turning a data URL into raw bytes.
pub trait DataUrlDecoder: Send + Sync {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageBytes, DecodeError>>;
}

/// Decodes data URLs in-process without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDataUrlDecoder;

impl DataUrlDecoder for InlineDataUrlDecoder {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageBytes, DecodeError>> {
        Box::pin(std::future::ready(
            DataUrl::parse(url).map(|d| ImageBytes::new(d.body)),
        ))
    }
}

/// Encode bytes as a base64 data URL with the given MIME type.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("{DATA_URL_PREFIX}{mime};base64,{}", STANDARD.encode(bytes))
}
