//! Observability setup for mxpost: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
