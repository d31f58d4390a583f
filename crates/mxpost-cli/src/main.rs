//! mxpost entry point.
//!
//! Binary name: `mxpost`
//!
//! Parses CLI arguments, sets up tracing, then runs a single session that
//! posts standard input to a Matrix room and exits with a status code
//! describing the outcome.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use console::style;

use cli::{Cli, EXIT_INVALID_INPUT, EXIT_OK, exit_code, outcome_of};

/// How long the runtime waits for stray blocking tasks on exit. Reading
/// stdin parks a blocking thread that cannot be interrupted.
const RUNTIME_SHUTDOWN: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                EXIT_INVALID_INPUT
            } else {
                EXIT_OK
            };
            let _ = err.print();
            return Ok(ExitCode::from(code));
        }
    };

    let filter = mxpost_observe::tracing_setup::default_filter(cli.verbose, cli.quiet);
    if let Err(e) = mxpost_observe::tracing_setup::init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let code = match runtime.block_on(cli::send::handle_send(&cli)) {
        Ok(report) => {
            tracing::debug!(
                room_id = %report.room_id,
                joined = report.joined,
                messages = report.delivery.messages(),
                "session finished"
            );
            EXIT_OK
        }
        Err(err) => {
            eprintln!("{} {err:#}", style("Error:").for_stderr().red().bold());
            exit_code(outcome_of(&err))
        }
    };

    mxpost_observe::tracing_setup::shutdown_tracing();
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);

    Ok(ExitCode::from(code))
}
