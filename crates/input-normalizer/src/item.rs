//! Payload items and the async capabilities they carry.

use futures::future::BoxFuture;

use crate::ImageBytes;

/// A handle that can produce the raw bytes of a file.
pub trait FileSource: Send + Sync {
    /// File name as reported by the origin, if any.
    fn file_name(&self) -> Option<&str> {
        None
    }

    /// Read the full contents of the file.
    fn read_bytes(&self) -> BoxFuture<'_, std::io::Result<ImageBytes>>;
}

/// A handle that can materialize the value of a string item.
///
/// Resolves once; there is no retry on failure.
pub trait StringSource: Send + Sync {
    fn read_string(&self) -> BoxFuture<'_, std::io::Result<String>>;
}

/// A string-typed item with its declared MIME type.
pub struct StringItem {
    mime: String,
    source: Box<dyn StringSource>,
}

impl StringItem {
    pub fn new(mime: impl Into<String>, source: impl StringSource + 'static) -> Self {
        Self {
            mime: mime.into(),
            source: Box::new(source),
        }
    }

    /// Declared content type, e.g. `text/uri-list`.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub async fn read_string(&self) -> std::io::Result<String> {
        self.source.read_string().await
    }
}

impl std::fmt::Debug for StringItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringItem")
            .field("mime", &self.mime)
            .finish_non_exhaustive()
    }
}

/// One entry of a drop or paste payload.
pub enum Item {
    File(Box<dyn FileSource>),
    String(StringItem),
}

impl Item {
    pub fn file(source: impl FileSource + 'static) -> Self {
        Self::File(Box::new(source))
    }

    pub fn string(mime: impl Into<String>, source: impl StringSource + 'static) -> Self {
        Self::String(StringItem::new(mime, source))
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(source) => f
                .debug_struct("File")
                .field("name", &source.file_name())
                .finish(),
            Self::String(item) => std::fmt::Debug::fmt(item, f),
        }
    }
}

/// Items of a single user interaction, in origin order.
#[derive(Debug, Default)]
pub struct Payload {
    items: Vec<Item>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn with(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first file item, which always wins over string items.
    pub fn first_file(&self) -> Option<&dyn FileSource> {
        self.items.iter().find_map(|item| match item {
            Item::File(source) => Some(source.as_ref()),
            Item::String(_) => None,
        })
    }

    /// The first string item declared with exactly `mime`.
    pub fn first_string_of(&self, mime: &str) -> Option<&StringItem> {
        self.items.iter().find_map(|item| match item {
            Item::String(s) if s.mime() == mime => Some(s),
            _ => None,
        })
    }

    /// Name of the file item that normalization would pick, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.first_file().and_then(|f| f.file_name())
    }
}

impl FromIterator<Item> for Payload {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
