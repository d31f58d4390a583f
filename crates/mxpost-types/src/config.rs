//! Configuration types for mxpost.
//!
//! `FileConfig` is the optional `~/.mxpost.toml` layer; `SessionConfig` is
//! the fully resolved, immutable configuration a single run consumes.

use std::fmt;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Raw `max-chars` value meaning "no limit, one message per line".
pub const UNLIMITED_MAX_CHARS: i64 = -1;

/// Default `max-chars` when neither the CLI nor the config file sets one.
pub const DEFAULT_MAX_CHARS: i64 = 512;

/// Appended to a bounded message whose input exceeded the limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Smallest usable limit: the truncation marker alone must fit.
pub const MIN_MAX_CHARS: usize = TRUNCATION_MARKER.len();

/// How standard input is framed into messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxChars {
    /// One message of at most this many characters, truncated with a marker.
    Limited(usize),
    /// One message per input line, never truncated.
    Unlimited,
}

impl MaxChars {
    /// Interpret a raw `max-chars` setting.
    ///
    /// `-1` selects unlimited mode. Limits below [`MIN_MAX_CHARS`] cannot hold
    /// the truncation marker and are rejected.
    pub fn from_raw(raw: i64) -> Result<Self, ConfigError> {
        if raw == UNLIMITED_MAX_CHARS {
            return Ok(Self::Unlimited);
        }
        match usize::try_from(raw) {
            Ok(limit) if limit >= MIN_MAX_CHARS => Ok(Self::Limited(limit)),
            _ => Err(ConfigError::InvalidMaxChars(raw)),
        }
    }
}

impl Default for MaxChars {
    fn default() -> Self {
        Self::Limited(DEFAULT_MAX_CHARS as usize)
    }
}

/// Fully resolved settings for one session run.
#[derive(Debug)]
pub struct SessionConfig {
    /// Homeserver base URL, e.g. `https://matrix.org`.
    pub server: String,
    pub username: String,
    pub password: SecretString,
    /// Room id or alias, exactly as configured.
    pub room: String,
    /// Emit progress lines for each step.
    pub verbose: bool,
    pub max_chars: MaxChars,
}

/// Settings read from the TOML config file. Every key is optional; CLI flags
/// take precedence over whatever is set here.
///
/// ```toml
/// server = "https://matrix.example.org"
/// username = "alerts"
/// password = "hunter2"
/// room = "#ops:example.org"
/// max-chars = 1024
/// verbose = true
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub room: Option<String>,
    pub verbose: Option<bool>,
    pub max_chars: Option<i64>,
}

// Hand-written so the password never reaches logs.
impl fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("room", &self.room)
            .field("verbose", &self.verbose)
            .field("max_chars", &self.max_chars)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_chars_sentinel_is_unlimited() {
        assert_eq!(MaxChars::from_raw(-1).unwrap(), MaxChars::Unlimited);
    }

    #[test]
    fn test_max_chars_accepts_marker_sized_limit() {
        assert_eq!(MaxChars::from_raw(3).unwrap(), MaxChars::Limited(3));
        assert_eq!(MaxChars::from_raw(512).unwrap(), MaxChars::Limited(512));
    }

    #[test]
    fn test_max_chars_rejects_small_and_negative() {
        for raw in [0, 1, 2, -2, i64::MIN] {
            assert!(
                matches!(MaxChars::from_raw(raw), Err(ConfigError::InvalidMaxChars(r)) if r == raw),
                "raw {raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_max_chars_default() {
        assert_eq!(MaxChars::default(), MaxChars::Limited(512));
    }

    #[test]
    fn test_file_config_deserialize_with_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.server.is_none());
        assert!(config.max_chars.is_none());
    }

    #[test]
    fn test_file_config_deserialize_kebab_case() {
        let toml_str = r##"
server = "https://matrix.example.org"
username = "alerts"
password = "hunter2"
room = "#ops:example.org"
max-chars = -1
verbose = true
"##;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.as_deref(), Some("https://matrix.example.org"));
        assert_eq!(config.room.as_deref(), Some("#ops:example.org"));
        assert_eq!(config.max_chars, Some(-1));
        assert_eq!(config.verbose, Some(true));
    }

    #[test]
    fn test_file_config_debug_redacts_password() {
        let config = FileConfig {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
