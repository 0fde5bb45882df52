//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ConfigError;

use super::types::Config;

/// Name of the configuration file looked up at the repository root
pub const CONFIG_FILE_NAME: &str = "switchyard.toml";

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    info!(path = %path.display(), "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: Config = toml::from_str(&content).map_err(ConfigError::TomlError)?;

    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load `switchyard.toml` from a directory, or fall back to defaults.
///
/// A missing file is the normal case for repositories that rely on the
/// built-in conventions. A file that exists but does not parse is
/// reported and also falls back, so selection can still degrade to the
/// conservative full-suite path instead of aborting the pipeline.
pub fn load_config_or_default(dir: &Path) -> (Config, Option<PathBuf>) {
    let path = dir.join(CONFIG_FILE_NAME);
    match load_config(&path) {
        Ok(config) => (config, Some(path)),
        Err(ConfigError::NotFound(_)) => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            (Config::default(), None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            (Config::default(), None)
        }
    }
}
