//! Matrix client-server API (v3) implementation of `MatrixClient`.
//!
//! - `client`: `HttpMatrixClient` built on reqwest
//! - `types`: request/response bodies

pub mod client;
pub mod types;

pub use client::HttpMatrixClient;
