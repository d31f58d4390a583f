//! CLI definitions for the `mxpost` binary.
//!
//! Uses clap derive macros for argument parsing. Every connection setting can
//! also come from the config file; flags given here take precedence.

pub mod progress;
pub mod send;
pub mod settings;

use clap::{ArgAction, Parser};

use mxpost_types::error::{ConfigError, SessionError};
use mxpost_types::session::RunOutcome;

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVALID_INPUT: u8 = 1;
pub const EXIT_OPERATION_FAILED: u8 = 2;

/// Post standard input to a Matrix room.
#[derive(Parser)]
#[command(name = "mxpost", version, about, long_about = None)]
pub struct Cli {
    /// Print progress for each step (-v); repeat for diagnostics (-vv, -vvv).
    #[arg(
        short = 'v',
        long = "verbose",
        visible_short_alias = 'l',
        visible_alias = "log",
        action = ArgAction::Count
    )]
    pub verbose: u8,

    /// Suppress diagnostics except errors.
    #[arg(long)]
    pub quiet: bool,

    /// Homeserver URL to connect to (e.g. https://matrix.org).
    #[arg(short, long)]
    pub server: Option<String>,

    /// Username to log in with.
    #[arg(short, long, visible_alias = "user")]
    pub username: Option<String>,

    /// Password to log in with; prompted for when omitted.
    #[arg(
        short,
        long,
        visible_alias = "pass",
        env = "MXPOST_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Room id or alias to send the message to.
    #[arg(short, long)]
    pub room: Option<String>,

    /// Configuration file [default: ~/.mxpost.toml].
    #[arg(short = 'c', long = "config-file", visible_alias = "configuration-file")]
    pub config_file: Option<String>,

    /// Maximum number of characters to send (-1 for unlimited, one message per line) [default: 512].
    #[arg(long, allow_negative_numbers = true)]
    pub max_chars: Option<i64>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, hide = true)]
    pub otel: bool,
}

/// Classify a failed run for the process exit code.
pub fn outcome_of(err: &anyhow::Error) -> RunOutcome {
    if let Some(session) = err.downcast_ref::<SessionError>() {
        return session.outcome();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return RunOutcome::InvalidInput;
    }
    RunOutcome::OperationFailed
}

pub fn exit_code(outcome: RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Success => EXIT_OK,
        RunOutcome::InvalidInput => EXIT_INVALID_INPUT,
        RunOutcome::OperationFailed => EXIT_OPERATION_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mxpost_types::error::ClientError;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_and_alias_flags() {
        let cli = Cli::try_parse_from([
            "mxpost", "-s", "https://m.org", "--user", "bot", "--pass", "pw", "-r", "#a:m.org",
            "-l", "-v", "--max-chars", "-1",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("https://m.org"));
        assert_eq!(cli.username.as_deref(), Some("bot"));
        assert_eq!(cli.password.as_deref(), Some("pw"));
        assert_eq!(cli.room.as_deref(), Some("#a:m.org"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_chars, Some(-1));
    }

    #[test]
    fn test_configuration_file_alias() {
        let cli = Cli::try_parse_from(["mxpost", "--configuration-file", "/tmp/x.toml"]).unwrap();
        assert_eq!(cli.config_file.as_deref(), Some("/tmp/x.toml"));
    }

    #[test]
    fn test_outcome_of_errors() {
        let err = anyhow::Error::from(SessionError::InvalidInput("empty".to_string()));
        assert_eq!(exit_code(outcome_of(&err)), EXIT_INVALID_INPUT);

        let err = anyhow::Error::from(SessionError::Client(ClientError::NotLoggedIn));
        assert_eq!(exit_code(outcome_of(&err)), EXIT_OPERATION_FAILED);

        let err = anyhow::Error::from(ConfigError::Missing("room"));
        assert_eq!(exit_code(outcome_of(&err)), EXIT_INVALID_INPUT);

        let err = anyhow::anyhow!("runtime exploded");
        assert_eq!(exit_code(outcome_of(&err)), EXIT_OPERATION_FAILED);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(exit_code(RunOutcome::Success), 0);
        assert_eq!(exit_code(RunOutcome::InvalidInput), 1);
        assert_eq!(exit_code(RunOutcome::OperationFailed), 2);
    }
}
