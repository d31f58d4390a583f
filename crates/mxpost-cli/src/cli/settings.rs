//! Layer CLI flags over the config file into a [`SessionConfig`].
//!
//! Precedence: flag (or `MXPOST_PASSWORD`) > config file > built-in default.

use console::{Term, style};
use dialoguer::Password;
use reqwest::Url;
use secrecy::SecretString;

use mxpost_types::config::{DEFAULT_MAX_CHARS, FileConfig, MaxChars, SessionConfig};
use mxpost_types::error::ConfigError;

use super::Cli;

/// Everything needed to start a run.
#[derive(Debug)]
pub struct ResolvedSettings {
    pub server_url: Url,
    pub session: SessionConfig,
}

/// Merge `cli` over `file`.
///
/// `prompt_password` is only called when neither source has a password; it
/// receives the username and returns `None` when no password can be read.
pub fn resolve_settings(
    cli: &Cli,
    file: FileConfig,
    prompt_password: impl FnOnce(&str) -> Option<String>,
) -> Result<ResolvedSettings, ConfigError> {
    let server = cli
        .server
        .clone()
        .or(file.server)
        .ok_or(ConfigError::Missing("server"))?;
    let server_url = parse_server(&server)?;

    let username = cli
        .username
        .clone()
        .or(file.username)
        .ok_or(ConfigError::Missing("username"))?;

    let room = cli
        .room
        .clone()
        .or(file.room)
        .ok_or(ConfigError::Missing("room"))?;

    let max_chars = MaxChars::from_raw(
        cli.max_chars
            .or(file.max_chars)
            .unwrap_or(DEFAULT_MAX_CHARS),
    )?;

    let verbose = cli.verbose > 0 || file.verbose.unwrap_or(false);

    let password = match cli.password.clone().or(file.password) {
        Some(password) => password,
        None => prompt_password(&username).ok_or(ConfigError::Missing("password"))?,
    };

    Ok(ResolvedSettings {
        server_url,
        session: SessionConfig {
            server,
            username,
            password: SecretString::from(password),
            room,
            verbose,
            max_chars,
        },
    })
}

/// Ask for the password on the terminal.
///
/// Returns `None` when stderr is not attended (piped runs) or the prompt fails.
pub fn prompt_password(username: &str) -> Option<String> {
    if !Term::stderr().features().is_attended() {
        return None;
    }
    Password::new()
        .with_prompt(format!("Password for {}", style(username).bold()))
        .interact()
        .inspect_err(|err| tracing::debug!(error = %err, "password prompt failed"))
        .ok()
}

fn parse_server(server: &str) -> Result<Url, ConfigError> {
    match Url::parse(server) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(ConfigError::InvalidServer(server.to_string())),
    }
}
