//! Shared domain types for mxpost.
//!
//! Session configuration, room references, run outcomes and the error enums
//! used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod room;
pub mod session;
