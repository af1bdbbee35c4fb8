//! Configuration file resolution and loading

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "HLS_AUDIO_CONFIG";

/// Directory name used under the platform config dir
const APP_DIR: &str = "hls-audio";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`HLS_AUDIO_CONFIG`)
/// 3. Platform config directory (`<config_dir>/hls-audio/config.toml`) if it exists
/// 4. None (compiled defaults are used)
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    env_var: String,
}

impl ConfigResolver {
    /// Create a resolver reading the default environment variable
    pub fn new() -> Self {
        Self::with_env_var(CONFIG_ENV_VAR)
    }

    /// Create a resolver reading a custom environment variable
    pub fn with_env_var(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
        }
    }

    /// Resolve the config file path, if any applies
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|path| path.exists())
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform config file location (`~/.config/hls-audio/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Load and parse a TOML config file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a TOML config file, falling back to defaults
///
/// A missing file (or no file at all) is not fatal: a warning is logged and
/// `T::default()` is returned. A file that exists but fails to parse is an error.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {:?} not found, using built-in defaults", path);
        return Ok(T::default());
    }

    let config = load_toml(path)?;
    info!("Loaded configuration from {:?}", path);
    Ok(config)
}
