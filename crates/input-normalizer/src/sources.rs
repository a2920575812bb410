//! Concrete file and string capabilities.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tracing::debug;

use crate::ImageBytes;
use crate::item::{FileSource, StringSource};

/// File contents already held in memory (stdin, clipboard image).
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: Option<String>,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { name: None, bytes }
    }

    pub fn named(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            bytes,
        }
    }
}

impl FileSource for MemoryFile {
    fn file_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn read_bytes(&self) -> BoxFuture<'_, std::io::Result<ImageBytes>> {
        Box::pin(std::future::ready(Ok(ImageBytes::new(self.bytes.clone()))))
    }
}

/// A file on disk, read lazily when normalization picks it.
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
    name: Option<String>,
}

impl PathFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for PathFile {
    fn file_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn read_bytes(&self) -> BoxFuture<'_, std::io::Result<ImageBytes>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path).await?;
            debug!(path = %self.path.display(), len = bytes.len(), "Read file item");
            Ok(ImageBytes::new(bytes))
        })
    }
}

/// A string item whose value is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralString(pub String);

impl LiteralString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl StringSource for LiteralString {
    fn read_string(&self) -> BoxFuture<'_, std::io::Result<String>> {
        Box::pin(std::future::ready(Ok(self.0.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn path_file_reads_contents_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = PathFile::new(&path);
        assert_eq!(file.file_name(), Some("cat.png"));
        assert_eq!(file.read_bytes().await.unwrap().as_slice(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = PathFile::new(dir.path().join("nope.png"));
        let err = file.read_bytes().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn memory_file_can_be_read_repeatedly() {
        let file = MemoryFile::named("clip.png", vec![9, 8, 7]);
        assert_eq!(file.file_name(), Some("clip.png"));
        let first = file.read_bytes().await.unwrap();
        let second = file.read_bytes().await.unwrap();
        assert_eq!(first, second);
    }
}
