//! Human-readable progress lines for verbose runs.
//!
//! Purely observational: nothing a sink does can change the pipeline.

/// Receives one progress line per call.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn emit(&self, _line: &str) {}
}
