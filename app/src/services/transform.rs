//! Transform pipeline: payload -> normalized bytes -> composited output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_processor::{AssetCache, OutputFormat, ProcessError, TemplateLayout};
use input_normalizer::{NormalizeError, Normalizer, Payload, encode_data_url};
use tracing::{debug, info};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Failed to load template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One finished image, ready to be offered for download.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub download_name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl Rendered {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Inline data URL carrying the output format's MIME type.
    pub fn to_data_url(&self) -> String {
        encode_data_url(&self.bytes, self.mime_type())
    }
}

/// Runs one payload through normalization and template composition.
pub struct Transformer {
    normalizer: Normalizer,
    cache: Arc<AssetCache>,
    template_path: PathBuf,
    layout: TemplateLayout,
    format: OutputFormat,
    prefix: String,
}

impl Transformer {
    pub fn new(config: &AppConfig, cache: Arc<AssetCache>) -> Self {
        Self {
            normalizer: Normalizer::default(),
            cache,
            template_path: config.template_path.clone(),
            layout: config.layout,
            format: config.output_format,
            prefix: config.filename_prefix.clone(),
        }
    }

    /// Transform `payload`. `Ok(None)` means the payload held no usable
    /// image and nothing was attempted.
    pub async fn transform(&self, payload: &Payload) -> Result<Option<Rendered>, TransformError> {
        let Some(input) = self.normalizer.normalize(payload).await? else {
            debug!("No usable image in payload, skipping");
            return Ok(None);
        };

        let template = self.load_template().await?;
        let layout = self.layout;
        let format = self.format;
        let bytes = tokio::task::spawn_blocking(move || {
            let composed = image_processor::compose_on_template(input.as_slice(), &template, &layout)?;
            image_processor::encode(&composed, format)
        })
        .await??;

        let download_name = download_name(&self.prefix, payload.file_name(), format);
        info!(name = %download_name, len = bytes.len(), "Rendered image");

        Ok(Some(Rendered {
            download_name,
            format,
            bytes,
        }))
    }

    async fn load_template(&self) -> Result<Arc<[u8]>, TransformError> {
        let path = self.template_path.clone();
        let key = path.to_string_lossy().into_owned();
        self.cache
            .get_or_try_load(&key, || async {
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| TransformError::Template {
                        path: path.clone(),
                        source,
                    })
            })
            .await
    }
}

/// `<prefix><stem>.<ext>` for named inputs, `<prefix>.<ext>` otherwise.
pub fn download_name(prefix: &str, file_name: Option<&str>, format: OutputFormat) -> String {
    let stem = file_name
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{prefix}{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use input_normalizer::{Item, LiteralString, MemoryFile, URI_LIST};

    fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)));
        image_processor::encode(&img, OutputFormat::Png).unwrap()
    }

    fn transformer(dir: &Path, format: OutputFormat) -> (Transformer, Arc<AssetCache>) {
        let template_path = dir.join("yells_at.png");
        std::fs::write(&template_path, png(100, 80, [255, 255, 255, 255])).unwrap();
        let config = AppConfig {
            template_path,
            output_dir: dir.to_path_buf(),
            output_format: format,
            ..AppConfig::default()
        };
        let cache = Arc::new(AssetCache::new());
        (Transformer::new(&config, Arc::clone(&cache)), cache)
    }

    #[test]
    fn download_names() {
        assert_eq!(
            download_name("yells_at_", Some("cat.jpg"), OutputFormat::Png),
            "yells_at_cat.png"
        );
        assert_eq!(
            download_name("yells_at_", None, OutputFormat::Png),
            "yells_at_.png"
        );
        assert_eq!(
            download_name("x_", Some("archive.tar.gz"), OutputFormat::Jpeg),
            "x_archive.tar.jpg"
        );
    }

    #[tokio::test]
    async fn file_payload_is_composited_onto_template() {
        let dir = tempfile::tempdir().unwrap();
        let (transformer, cache) = transformer(dir.path(), OutputFormat::Png);

        let payload = Payload::new().with(Item::file(MemoryFile::named(
            "cat.png",
            png(20, 20, [255, 0, 0, 255]),
        )));
        let rendered = transformer.transform(&payload).await.unwrap().unwrap();

        assert_eq!(rendered.download_name, "yells_at_cat.png");
        assert_eq!(rendered.mime_type(), "image/png");
        let out = image::load_from_memory(&rendered.bytes).unwrap().to_rgba8();
        assert_eq!((out.width(), out.height()), (100, 80));
        assert_eq!(out.get_pixel(10, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn data_url_payload_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let (transformer, _) = transformer(dir.path(), OutputFormat::Jpeg);

        let url = encode_data_url(&png(8, 8, [0, 255, 0, 255]), "image/png");
        let payload = Payload::new().with(Item::string(URI_LIST, LiteralString::new(url)));
        let rendered = transformer.transform(&payload).await.unwrap().unwrap();

        assert_eq!(rendered.download_name, "yells_at_.jpg");
        assert_eq!(
            image::guess_format(&rendered.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        assert!(rendered.to_data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn unusable_payload_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (transformer, cache) = transformer(dir.path(), OutputFormat::Png);

        let payload = Payload::new().with(Item::string("text/plain", LiteralString::new("hello")));
        assert!(transformer.transform(&payload).await.unwrap().is_none());
        assert!(cache.is_empty(), "template must not be loaded for NotFound");
    }

    #[tokio::test]
    async fn template_is_loaded_once_across_transforms() {
        let dir = tempfile::tempdir().unwrap();
        let (transformer, cache) = transformer(dir.path(), OutputFormat::Png);
        let payload =
            Payload::new().with(Item::file(MemoryFile::new(png(4, 4, [0, 0, 0, 255]))));

        transformer.transform(&payload).await.unwrap();
        std::fs::remove_file(dir.path().join("yells_at.png")).unwrap();
        // Still served from cache after the file is gone.
        assert!(transformer.transform(&payload).await.unwrap().is_some());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            template_path: dir.path().join("missing.png"),
            ..AppConfig::default()
        };
        let transformer = Transformer::new(&config, Arc::new(AssetCache::new()));
        let payload =
            Payload::new().with(Item::file(MemoryFile::new(png(4, 4, [0, 0, 0, 255]))));

        let err = transformer.transform(&payload).await.unwrap_err();
        assert!(matches!(err, TransformError::Template { .. }));
    }

    #[tokio::test]
    async fn undecodable_input_is_a_process_error() {
        let dir = tempfile::tempdir().unwrap();
        let (transformer, _) = transformer(dir.path(), OutputFormat::Png);
        let payload = Payload::new().with(Item::file(MemoryFile::new(b"garbage".to_vec())));

        let err = transformer.transform(&payload).await.unwrap_err();
        assert!(matches!(err, TransformError::Process(ProcessError::Decode { .. })));
    }
}
