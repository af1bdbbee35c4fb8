//! Server configuration file layout

use std::path::PathBuf;

use hls_audio::StreamSettings;
use hls_common::logging::LoggingConfig;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_MEDIA_DIR: &str = "media";

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    /// HLS output directory, served under `/assets`
    pub assets_dir: PathBuf,
    /// Only files under this directory can be enqueued over HTTP
    pub media_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
        }
    }
}

/// Whole config file as read by hls-server
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerSettings,
}
