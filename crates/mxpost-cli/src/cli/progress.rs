//! Terminal progress output.

use console::Term;

use mxpost_core::progress::ProgressSink;

/// Writes progress lines to stdout with one line per step.
pub struct StdoutProgress {
    term: Term,
}

impl StdoutProgress {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for StdoutProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for StdoutProgress {
    fn emit(&self, line: &str) {
        // A closed stdout must not fail the run.
        if let Err(err) = self.term.write_line(line) {
            tracing::debug!(error = %err, "dropped progress line");
        }
    }
}
