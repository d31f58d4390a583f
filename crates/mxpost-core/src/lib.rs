//! Session orchestration and message framing for mxpost.
//!
//! This crate defines the `MatrixClient` port that the infrastructure layer
//! implements, plus the logic driving one login-join-send-logout run. It
//! depends only on `mxpost-types` -- never on `mxpost-infra` or any HTTP crate.

pub mod client;
pub mod framer;
pub mod progress;
pub mod session;

#[cfg(test)]
mod mock;
