//! Stream configuration
//!
//! Every option has a built-in default; the bitrate ladder is the only
//! required input. Configuration is validated once, when the `Stream` is
//! constructed, and is immutable afterwards.
//!
//! The `[stream]` section of the TOML config file deserializes into
//! [`StreamSettings`], which converts into a [`StreamConfig`].

use crate::audio::AudioInfo;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;
use std::time::Duration;

/// Default codec passed to `-c:a`
pub const DEFAULT_ENCODING: &str = "aac";
/// Default `-hls_list_size`
pub const DEFAULT_HLS_LIST_SIZE: u32 = 80;
/// Default `-hls_time` (seconds)
pub const DEFAULT_HLS_TIME: u32 = 5;
/// Default `-hls_segment_filename`
pub const DEFAULT_SEGMENT_FILENAME: &str = "hls-%v/hls-segment-%06d.ts";
/// Default variant playlist output name
pub const DEFAULT_PLAYLIST_NAME: &str = "hls-%v/hls-playlist.m3u8";
/// Default `-master_pl_name`
pub const DEFAULT_MASTER_PLAYLIST_NAME: &str = "master.m3u8";
/// Default wait for an observer to take a dequeue notification
pub const DEFAULT_DEQUEUED_TIMEOUT: Duration = Duration::from_secs(1);
/// Debug logging is off unless requested
pub const DEFAULT_DEBUG_LOGGING: bool = false;
/// Default engine executable
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Variant index placeholder required in output templates
const VARIANT_PLACEHOLDER: &str = "%v";

/// Computes the `-metadata title=` value for an item
pub type MetadataTitleFn = Arc<dyn Fn(&AudioInfo) -> String + Send + Sync>;

/// `"<Artist> - <Title>"`
pub fn default_metadata_title(audio: &AudioInfo) -> String {
    format!("{} - {}", audio.artist, audio.title)
}

/// Complete, resolved stream configuration
#[derive(Clone)]
pub struct StreamConfig {
    /// Bitrate ladder, one entry per variant stream (e.g. `"128k"`)
    pub bitrates: Vec<String>,
    pub encoding: String,
    pub hls_list_size: u32,
    pub hls_time: u32,
    /// Segment template with `%v` (variant) and a segment-number placeholder
    pub segment_filename: String,
    /// Variant playlist template with `%v`
    pub playlist_name: String,
    /// Bare file name of the master playlist
    pub master_playlist_name: String,
    pub dequeued_timeout: Duration,
    pub debug_logging: bool,
    pub metadata_title: MetadataTitleFn,
}

impl StreamConfig {
    /// Configuration with the given ladder and every other option defaulted
    pub fn new<I, S>(bitrates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bitrates: bitrates.into_iter().map(Into::into).collect(),
            encoding: DEFAULT_ENCODING.to_string(),
            hls_list_size: DEFAULT_HLS_LIST_SIZE,
            hls_time: DEFAULT_HLS_TIME,
            segment_filename: DEFAULT_SEGMENT_FILENAME.to_string(),
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            master_playlist_name: DEFAULT_MASTER_PLAYLIST_NAME.to_string(),
            dequeued_timeout: DEFAULT_DEQUEUED_TIMEOUT,
            debug_logging: DEFAULT_DEBUG_LOGGING,
            metadata_title: Arc::new(default_metadata_title),
        }
    }

    /// Replace the metadata title function
    pub fn with_metadata_title<F>(mut self, f: F) -> Self
    where
        F: Fn(&AudioInfo) -> String + Send + Sync + 'static,
    {
        self.metadata_title = Arc::new(f);
        self
    }

    /// Title written into the item's `-metadata title=` argument
    pub fn metadata_title(&self, audio: &AudioInfo) -> String {
        (self.metadata_title)(audio)
    }

    /// Reject invalid combinations
    ///
    /// Called by `Stream` construction; a stream never exists with a
    /// configuration that fails here.
    pub fn validate(&self) -> Result<()> {
        if self.master_playlist_name.trim().is_empty() {
            return Err(Error::Config(
                "master playlist name must not be empty".to_string(),
            ));
        }
        if !is_bare_file_name(&self.master_playlist_name) {
            return Err(Error::MasterPlaylistDirectory);
        }

        if self.bitrates.is_empty() {
            return Err(Error::Config(
                "bitrate ladder must contain at least one bitrate".to_string(),
            ));
        }
        if let Some(i) = self.bitrates.iter().position(|r| r.trim().is_empty()) {
            return Err(Error::Config(format!("bitrate at index {} is empty", i)));
        }

        if self.hls_time == 0 {
            return Err(Error::Config("hls_time must be at least 1 second".to_string()));
        }
        if self.encoding.trim().is_empty() {
            return Err(Error::Config("encoding must not be empty".to_string()));
        }

        if !self.segment_filename.contains(VARIANT_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "segment filename {:?} must contain the {} variant placeholder",
                self.segment_filename, VARIANT_PLACEHOLDER
            )));
        }
        if !self.playlist_name.contains(VARIANT_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "playlist name {:?} must contain the {} variant placeholder",
                self.playlist_name, VARIANT_PLACEHOLDER
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field("bitrates", &self.bitrates)
            .field("encoding", &self.encoding)
            .field("hls_list_size", &self.hls_list_size)
            .field("hls_time", &self.hls_time)
            .field("segment_filename", &self.segment_filename)
            .field("playlist_name", &self.playlist_name)
            .field("master_playlist_name", &self.master_playlist_name)
            .field("dequeued_timeout", &self.dequeued_timeout)
            .field("debug_logging", &self.debug_logging)
            .finish_non_exhaustive()
    }
}

/// A single normal path component, `./` prefixes allowed
fn is_bare_file_name(name: &str) -> bool {
    let mut normal = 0;
    for component in Path::new(name).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(_) => normal += 1,
            _ => return false,
        }
    }
    normal == 1 && !name.ends_with('/') && !name.ends_with('\\') && !name.contains('\\')
}

/// `[stream]` section of the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub bitrates: Vec<String>,
    pub encoding: String,
    pub hls_list_size: u32,
    pub hls_time: u32,
    pub segment_filename: String,
    pub playlist_name: String,
    pub master_playlist_name: String,
    pub dequeued_timeout_ms: u64,
    pub debug_logging: bool,
    /// Engine executable used by the binaries
    pub ffmpeg_path: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            bitrates: vec!["128k".to_string(), "64k".to_string()],
            encoding: DEFAULT_ENCODING.to_string(),
            hls_list_size: DEFAULT_HLS_LIST_SIZE,
            hls_time: DEFAULT_HLS_TIME,
            segment_filename: DEFAULT_SEGMENT_FILENAME.to_string(),
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            master_playlist_name: DEFAULT_MASTER_PLAYLIST_NAME.to_string(),
            dequeued_timeout_ms: DEFAULT_DEQUEUED_TIMEOUT.as_millis() as u64,
            debug_logging: DEFAULT_DEBUG_LOGGING,
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
        }
    }
}

impl StreamSettings {
    /// Convert into a stream configuration (validated later by `Stream`)
    pub fn into_config(self) -> StreamConfig {
        StreamConfig {
            bitrates: self.bitrates,
            encoding: self.encoding,
            hls_list_size: self.hls_list_size,
            hls_time: self.hls_time,
            segment_filename: self.segment_filename,
            playlist_name: self.playlist_name,
            master_playlist_name: self.master_playlist_name,
            dequeued_timeout: Duration::from_millis(self.dequeued_timeout_ms),
            debug_logging: self.debug_logging,
            metadata_title: Arc::new(default_metadata_title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::new(["128k", "64k"]);
        assert_eq!(config.bitrates, vec!["128k", "64k"]);
        assert_eq!(config.encoding, "aac");
        assert_eq!(config.hls_list_size, 80);
        assert_eq!(config.hls_time, 5);
        assert_eq!(config.segment_filename, "hls-%v/hls-segment-%06d.ts");
        assert_eq!(config.playlist_name, "hls-%v/hls-playlist.m3u8");
        assert_eq!(config.master_playlist_name, "master.m3u8");
        assert_eq!(config.dequeued_timeout, Duration::from_secs(1));
        assert!(!config.debug_logging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_metadata_title() {
        let config = StreamConfig::new(["128k"]);
        let info = AudioInfo::new(1, "Foo", "Bar");
        assert_eq!(config.metadata_title(&info), "Foo - Bar");

        let config = config.with_metadata_title(|a| a.title.to_uppercase());
        assert_eq!(config.metadata_title(&info), "BAR");
    }

    #[test]
    fn test_master_playlist_with_directory_rejected() {
        for name in ["hello/master.m3u8", "/master.m3u8", "../master.m3u8", "a/b/c.m3u8"] {
            let mut config = StreamConfig::new(["128k"]);
            config.master_playlist_name = name.to_string();
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, Error::MasterPlaylistDirectory),
                "{} should be rejected, got {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_master_playlist_bare_names_accepted() {
        for name in ["master.m3u8", "./test.m3u8"] {
            let mut config = StreamConfig::new(["128k"]);
            config.master_playlist_name = name.to_string();
            assert!(config.validate().is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_empty_ladder_rejected() {
        let config = StreamConfig::new(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = StreamConfig::new(["128k", " "]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_templates_need_variant_placeholder() {
        let mut config = StreamConfig::new(["128k"]);
        config.segment_filename = "segment-%d.ts".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = StreamConfig::new(["128k"]);
        config.playlist_name = "playlist.m3u8".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_hls_time_rejected() {
        let mut config = StreamConfig::new(["128k"]);
        config.hls_time = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_convert_to_config() {
        let settings = StreamSettings {
            hls_time: 8,
            dequeued_timeout_ms: 250,
            ..StreamSettings::default()
        };
        let config = settings.into_config();
        assert_eq!(config.hls_time, 8);
        assert_eq!(config.dequeued_timeout, Duration::from_millis(250));
        assert_eq!(config.bitrates, vec!["128k", "64k"]);
    }
}
