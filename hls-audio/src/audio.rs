//! Audio items accepted by the stream queue

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tokio::io::AsyncRead;

/// Readable byte stream of an audio item, piped into the encoding engine
pub type AudioData = Box<dyn AsyncRead + Send + Unpin>;

/// Descriptive part of an audio item
///
/// This is what observers receive when the item leaves the queue; the byte
/// stream itself belongs to the engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioInfo {
    pub id: i64,
    pub artist: String,
    pub title: String,
    /// Extra `-metadata` entries forwarded to the engine
    pub metadata: BTreeMap<String, String>,
    /// Codec used for this item instead of the stream default
    pub override_encoding: Option<String>,
}

impl AudioInfo {
    pub fn new(id: i64, artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            artist: artist.into(),
            title: title.into(),
            metadata: BTreeMap::new(),
            override_encoding: None,
        }
    }
}

impl fmt::Display for AudioInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// A unit of work: audio bytes plus their description
pub struct Audio {
    pub info: AudioInfo,
    pub data: AudioData,
}

impl Audio {
    /// Create an audio item from any async reader
    pub fn new<R>(id: i64, artist: impl Into<String>, title: impl Into<String>, data: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            info: AudioInfo::new(id, artist, title),
            data: Box::new(data),
        }
    }

    /// Create an audio item from in-memory bytes
    pub fn from_bytes(
        id: i64,
        artist: impl Into<String>,
        title: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(id, artist, title, Cursor::new(bytes.into()))
    }

    /// Open an audio file as the item's byte stream
    pub async fn open(
        id: i64,
        artist: impl Into<String>,
        title: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(id, artist, title, file))
    }

    /// Replace the metadata mapping
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.info.metadata = metadata;
        self
    }

    /// Add a single metadata entry
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.metadata.insert(key.into(), value.into());
        self
    }

    /// Encode this item with `encoding` instead of the stream default
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.info.override_encoding = Some(encoding.into());
        self
    }

    /// Split into description and byte stream
    pub fn into_parts(self) -> (AudioInfo, AudioData) {
        (self.info, self.data)
    }
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.fmt(f)
    }
}
