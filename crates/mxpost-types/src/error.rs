use thiserror::Error;

use crate::session::RunOutcome;

/// Errors reported by a protocol client.
///
/// `Protocol` is a server-side rejection; every other variant originates
/// beneath the protocol layer. Both abort a session the same way, but the
/// variant (and its message) is carried up to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{errcode}: {message}")]
    Protocol {
        status: u16,
        errcode: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("client already closed")]
    Closed,
}

impl ClientError {
    /// Short, stable label for the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Protocol { .. } => "protocol",
            Self::Transport(_) => "transport",
            Self::Deserialization(_) => "deserialization",
            Self::NotLoggedIn => "not_logged_in",
            Self::Closed => "closed",
        }
    }
}

/// Errors that end a session run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to read standard input: {0}")]
    Input(#[from] std::io::Error),

    #[error("interrupted before the session completed")]
    Interrupted,
}

impl SessionError {
    /// Collapse the error into one of the outcomes surfaced to the process.
    pub fn outcome(&self) -> RunOutcome {
        match self {
            Self::InvalidInput(_) => RunOutcome::InvalidInput,
            Self::Client(_) | Self::Input(_) | Self::Interrupted => RunOutcome::OperationFailed,
        }
    }
}

/// Errors while assembling a [`SessionConfig`](crate::config::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("home directory expansion is not supported for '{0}'")]
    UnsupportedPath(String),

    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid max-chars {0}: use -1 for unlimited or a value of at least 3")]
    InvalidMaxChars(i64),

    #[error("invalid server URL '{0}'")]
    InvalidServer(String),
}
