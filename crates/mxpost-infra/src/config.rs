//! Config file loader for mxpost.
//!
//! Reads the optional TOML file (default `~/.mxpost.toml`) and deserializes
//! it into [`FileConfig`]. A missing file yields an empty config; a file that
//! exists but cannot be read or parsed is an error.

use std::path::{Path, PathBuf};

use mxpost_types::config::FileConfig;
use mxpost_types::error::ConfigError;

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "~/.mxpost.toml";

/// Expand a leading `~/` to the current user's home directory.
///
/// `~otheruser/...` is rejected rather than guessed at.
pub fn expand_config_path(raw: &str) -> Result<PathBuf, ConfigError> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(PathBuf::from(raw));
    };

    let rest = match rest.strip_prefix('/') {
        Some(rest) => rest,
        None if rest.is_empty() => rest,
        None => return Err(ConfigError::UnsupportedPath(raw.to_string())),
    };

    let home = dirs::home_dir().ok_or_else(|| ConfigError::UnsupportedPath(raw.to_string()))?;
    Ok(home.join(rest))
}

/// Load the config file at `path`.
///
/// - If the file does not exist, returns [`FileConfig::default()`].
/// - If it exists but cannot be read, returns [`ConfigError::Read`].
/// - If it is not valid TOML for [`FileConfig`], returns [`ConfigError::Parse`].
pub async fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<FileConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;

    tracing::debug!(?config, "loaded config file {}", path.display());
    Ok(config)
}
