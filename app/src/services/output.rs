//! Delivery of rendered images: files on disk or inline data URLs.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::transform::Rendered;

const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Where rendered images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Directory(PathBuf),
    DataUrl,
}

/// What happened to one rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Written(PathBuf),
    DataUrl(String),
}

pub struct OutputSink {
    mode: OutputMode,
}

impl OutputSink {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Deliver `rendered`. Existing files are never overwritten.
    pub async fn deliver(&self, rendered: &Rendered) -> std::io::Result<Delivery> {
        match &self.mode {
            OutputMode::DataUrl => Ok(Delivery::DataUrl(rendered.to_data_url())),
            OutputMode::Directory(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = write_unique(dir, &rendered.download_name, &rendered.bytes).await?;
                tracing::info!(path = %path.display(), "Wrote image");
                Ok(Delivery::Written(path))
            }
        }
    }
}

/// Write into `dir/name`, or `dir/name (N).ext` when taken.
async fn write_unique(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    use tokio::io::AsyncWriteExt;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = candidate_path(dir, name, attempt);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for {name} in {}", dir.display()),
    ))
}

/// `name` for attempt 0, `stem (N).ext` afterwards.
fn candidate_path(dir: &Path, name: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return dir.join(name);
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => dir.join(format!("{stem} ({attempt}).{}", ext.to_string_lossy())),
        None => dir.join(format!("{stem} ({attempt})")),
    }
}

/// Outcome of one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Written,
    DataUrl,
    NotFound,
    Failed,
}

/// One line of `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub fn not_found(source: String) -> Self {
        Self::bare(source, Status::NotFound)
    }

    pub fn failed(source: String, error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::bare(source, Status::Failed)
        }
    }

    pub fn delivered(source: String, rendered: &Rendered, delivery: Delivery) -> Self {
        let mut report = Self {
            mime: Some(rendered.mime_type()),
            bytes: Some(rendered.bytes.len()),
            ..Self::bare(source, Status::Written)
        };
        match delivery {
            Delivery::Written(path) => report.path = Some(path),
            Delivery::DataUrl(url) => {
                report.status = Status::DataUrl;
                report.data_url = Some(url);
            }
        }
        report
    }

    fn bare(source: String, status: Status) -> Self {
        Self {
            source,
            status,
            path: None,
            data_url: None,
            mime: None,
            bytes: None,
            error: None,
        }
    }

    /// Plain-text rendering for stdout when `--json` is off.
    pub fn human_line(&self) -> Option<String> {
        match self.status {
            Status::Written => self.path.as_ref().map(|p| p.display().to_string()),
            Status::DataUrl => self.data_url.clone(),
            Status::NotFound | Status::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_processor::OutputFormat;

    fn rendered(name: &str) -> Rendered {
        Rendered {
            download_name: name.into(),
            format: OutputFormat::Png,
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn candidate_paths() {
        let dir = Path::new("/out");
        assert_eq!(candidate_path(dir, "yells_at_cat.png", 0), dir.join("yells_at_cat.png"));
        assert_eq!(
            candidate_path(dir, "yells_at_cat.png", 2),
            dir.join("yells_at_cat (2).png")
        );
        assert_eq!(candidate_path(dir, "noext", 1), dir.join("noext (1)"));
    }

    #[tokio::test]
    async fn collisions_get_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(OutputMode::Directory(dir.path().to_path_buf()));

        let first = sink.deliver(&rendered("yells_at_.png")).await.unwrap();
        let second = sink.deliver(&rendered("yells_at_.png")).await.unwrap();

        assert_eq!(first, Delivery::Written(dir.path().join("yells_at_.png")));
        assert_eq!(second, Delivery::Written(dir.path().join("yells_at_ (1).png")));
        assert_eq!(std::fs::read(dir.path().join("yells_at_ (1).png")).unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let sink = OutputSink::new(OutputMode::Directory(nested.clone()));
        let delivery = sink.deliver(&rendered("x.png")).await.unwrap();
        assert_eq!(delivery, Delivery::Written(nested.join("x.png")));
    }

    #[tokio::test]
    async fn data_url_mode_writes_nothing() {
        let sink = OutputSink::new(OutputMode::DataUrl);
        let delivery = sink.deliver(&rendered("x.png")).await.unwrap();
        assert_eq!(delivery, Delivery::DataUrl("data:image/png;base64,AQID".into()));
    }

    #[test]
    fn report_json_omits_empty_fields() {
        let report = Report::delivered(
            "cat.png".into(),
            &rendered("yells_at_cat.png"),
            Delivery::Written(PathBuf::from("out/yells_at_cat.png")),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "written");
        assert_eq!(json["path"], "out/yells_at_cat.png");
        assert_eq!(json["mime"], "image/png");
        assert_eq!(json["bytes"], 3);
        assert!(json.get("error").is_none());
        assert!(json.get("data_url").is_none());

        let failed = serde_json::to_value(Report::failed("x".into(), "boom")).unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["error"], "boom");
    }

    #[test]
    fn human_lines() {
        let written = Report::delivered(
            "cat.png".into(),
            &rendered("a.png"),
            Delivery::Written(PathBuf::from("a.png")),
        );
        assert_eq!(written.human_line().as_deref(), Some("a.png"));
        assert!(Report::not_found("x".into()).human_line().is_none());
    }
}
