//! Runtime application configuration loaded from the environment.

use std::path::{Path, PathBuf};

use image_processor::{Offset, OutputFormat, TemplateLayout};

use super::defaults::{self, FORMAT, OFFSET, OUTPUT_DIR, PREFIX, SIZE, TEMPLATE};
use super::validation::validate_setting;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub layout: TemplateLayout,
    pub output_format: OutputFormat,
    pub filename_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(defaults::TEMPLATE_FILE_NAME),
            output_dir: PathBuf::from("."),
            layout: TemplateLayout::default(),
            output_format: OutputFormat::Png,
            filename_prefix: "yells_at_".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::load(|key| std::env::var(key).ok(), &super::data_dir())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing, empty, or invalid values.
    pub fn load(lookup: impl Fn(&str) -> Option<String>, data_dir: &Path) -> Self {
        let g = |key: &str| -> String {
            let default = defaults::get_default(key).unwrap_or_default();
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => {
                    let v = v.trim().to_string();
                    match validate_setting(key, &v) {
                        Ok(()) => v,
                        Err(reason) => {
                            tracing::warn!(key, value = %v, reason = %reason, "Invalid setting, using default");
                            default.to_string()
                        }
                    }
                }
                _ => default.to_string(),
            }
        };

        let template = g(TEMPLATE);
        let template_path = if template.is_empty() {
            default_template_path(Path::new("."), data_dir)
        } else {
            PathBuf::from(template)
        };

        Self {
            template_path,
            output_dir: PathBuf::from(g(OUTPUT_DIR)),
            layout: TemplateLayout {
                geometry: g(SIZE).parse().unwrap_or_default(),
                offset: g(OFFSET).parse().unwrap_or(Offset::new(10, 0)),
            },
            output_format: g(FORMAT).parse().unwrap_or_default(),
            filename_prefix: g(PREFIX),
        }
    }

    /// Human-readable problems that will make every transform fail.
    pub fn check(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.template_path.is_file() {
            warnings.push(format!(
                "template image not found at {}",
                self.template_path.display()
            ));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            warnings.push(format!(
                "output path {} is not a directory",
                self.output_dir.display()
            ));
        }
        warnings
    }
}

/// Template lookup order: working directory, then the data directory.
fn default_template_path(cwd: &Path, data_dir: &Path) -> PathBuf {
    let local = cwd.join(defaults::TEMPLATE_FILE_NAME);
    if local.is_file() {
        return local;
    }
    let shared = data_dir.join(defaults::TEMPLATE_FILE_NAME);
    if shared.is_file() {
        return shared;
    }
    local
}
