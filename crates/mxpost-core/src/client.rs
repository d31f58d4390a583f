//! MatrixClient trait definition.
//!
//! The protocol capability the session pipeline drives. Uses RPITIT so the
//! orchestrator stays generic over the concrete client without boxing.

use std::collections::HashSet;
use std::future::Future;

use secrecy::SecretString;

use mxpost_types::error::ClientError;

/// Operations a chat-protocol client must provide for one session run.
///
/// Every call may fail with a server rejection ([`ClientError::Protocol`]) or
/// a lower-level error; callers treat both as fatal but must pass the error
/// through unchanged.
///
/// Implementations live in mxpost-infra (e.g., `HttpMatrixClient`).
pub trait MatrixClient: Send + Sync {
    /// Log in with a password. Later calls use the resulting session.
    fn authenticate(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Resolve a room alias (`#room:server`) to a room id.
    fn resolve_alias(
        &self,
        alias: &str,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Room ids the logged-in user is currently joined to.
    fn joined_rooms(&self) -> impl Future<Output = Result<HashSet<String>, ClientError>> + Send;

    /// Join a room by id. Not assumed idempotent server-side.
    fn join_room(&self, room_id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Send one plain-text message to a room.
    fn send_message(
        &self,
        room_id: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Invalidate the server-side session.
    fn logout(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Release the transport and any background resources.
    ///
    /// Must be safe to call after a partial failure and more than once.
    fn close(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;
}
