//! The one command `mxpost` runs: post standard input and log out.

use anyhow::Result;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use mxpost_core::session::SessionOrchestrator;
use mxpost_infra::config::{DEFAULT_CONFIG_FILE, expand_config_path, load_file_config};
use mxpost_infra::matrix::HttpMatrixClient;
use mxpost_types::session::SessionReport;

use super::Cli;
use super::progress::StdoutProgress;
use super::settings::{prompt_password, resolve_settings};

/// Resolve settings, then run one session against the homeserver.
///
/// Ctrl+C or SIGTERM cancels the run; the client is still closed before
/// this returns.
pub async fn handle_send(cli: &Cli) -> Result<SessionReport> {
    let path = expand_config_path(cli.config_file.as_deref().unwrap_or(DEFAULT_CONFIG_FILE))?;
    let file = load_file_config(&path).await?;
    let settings = resolve_settings(cli, file, prompt_password)?;

    tracing::debug!(
        server = %settings.server_url,
        room = %settings.session.room,
        max_chars = ?settings.session.max_chars,
        "starting session"
    );

    let client = HttpMatrixClient::new(settings.server_url);
    let orchestrator =
        SessionOrchestrator::new(client, settings.session).with_progress(StdoutProgress::new());

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_signal(cancel.clone()));

    let result = orchestrator
        .run(BufReader::new(tokio::io::stdin()), cancel)
        .await;
    watcher.abort();

    Ok(result?)
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("interrupted, closing session");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mxpost_types::error::ConfigError;
    use tempfile::TempDir;

    fn cli_with_config(path: &std::path::Path, extra: &[&str]) -> Cli {
        let mut argv = vec!["mxpost", "-c", path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_config_file_fails_before_connecting() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mxpost.toml");
        std::fs::write(&path, "server = [not toml").unwrap();

        let err = handle_send(&cli_with_config(&path, &[])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_config_file_limit_is_validated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mxpost.toml");
        std::fs::write(
            &path,
            "server = \"http://127.0.0.1:9\"\nusername = \"alerts\"\nroom = \"!a:b\"\nmax-chars = 2\n",
        )
        .unwrap();

        let err = handle_send(&cli_with_config(&path, &[])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidMaxChars(2))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_flags() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");

        let err = handle_send(&cli_with_config(&path, &["-s", "https://m.org", "-u", "alerts"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing("room"))
        ));
    }
}
