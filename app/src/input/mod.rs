//! Input acquisition: turn each user interaction into a [`Payload`].
//!
//! One interaction is one file argument, one stdin read, one URI string,
//! one text string, or one clipboard paste.

pub mod clipboard;

use std::fmt;
use std::path::PathBuf;

use input_normalizer::{Item, LiteralString, MemoryFile, PathFile, Payload, URI_LIST};
use tokio::io::{AsyncRead, AsyncReadExt};

use clipboard::{ClipboardError, ClipboardProvider};

/// Where one interaction's items come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
    UriList(String),
    Text(String),
    Clipboard,
}

impl Source {
    /// Parse a positional argument: `-` is stdin, anything else a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
            Self::UriList(uri) => write!(f, "uri-list:{}", truncate(uri, 48)),
            Self::Text(text) => write!(f, "text:{}", truncate(text, 48)),
            Self::Clipboard => f.write_str("<clipboard>"),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Builds payloads for sources, owning the handles that need one.
pub struct PayloadBuilder<C> {
    clipboard: C,
}

impl<C: ClipboardProvider> PayloadBuilder<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    /// Build the payload for `source`, reading stdin from `stdin`.
    pub async fn build<R>(&self, source: &Source, stdin: R) -> Result<Payload, InputError>
    where
        R: AsyncRead + Unpin,
    {
        let payload = match source {
            Source::File(path) => Payload::new().with(Item::file(PathFile::new(path))),
            Source::Stdin => {
                let bytes = read_all(stdin).await?;
                tracing::debug!(len = bytes.len(), "Read payload from stdin");
                Payload::new().with(Item::file(MemoryFile::new(bytes)))
            }
            Source::UriList(uri) => {
                Payload::new().with(Item::string(URI_LIST, LiteralString::new(uri.as_str())))
            }
            Source::Text(text) => {
                Payload::new().with(Item::string("text/plain", LiteralString::new(text.as_str())))
            }
            Source::Clipboard => {
                let snapshot = self.clipboard.snapshot()?;
                clipboard::snapshot_to_payload(snapshot, chrono::Local::now())?
            }
        };
        Ok(payload)
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}
