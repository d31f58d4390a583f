//! Infrastructure layer for mxpost.
//!
//! Contains the concrete `MatrixClient` speaking the Matrix client-server
//! HTTP API, and the loader for the optional TOML config file.

pub mod config;
pub mod matrix;
