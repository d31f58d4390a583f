//! SessionOrchestrator -- one login, join, send, logout run.
//!
//! Steps run strictly one after another and each is awaited to completion
//! before the next begins:
//!
//! ```text
//! Idle -> Authenticated -> RoomResolved -> MembershipChecked
//!      -> [RoomJoined] -> MessageDelivered -> LoggedOut
//! ```
//!
//! Any failure moves to `Failed` and stops the pipeline. Logout only happens
//! on the success path. Client resources are released exactly once at the
//! end of [`SessionOrchestrator::run`], whatever the outcome, with a bounded
//! wait.

use std::time::Duration;

use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;

use mxpost_types::config::SessionConfig;
use mxpost_types::error::SessionError;
use mxpost_types::room::RoomTarget;
use mxpost_types::session::SessionReport;

use crate::client::MatrixClient;
use crate::framer::MessageFramer;
use crate::progress::{ProgressSink, SilentProgress};

/// Upper bound on waiting for the client to release its resources.
pub const TEARDOWN_GRACE: Duration = Duration::from_secs(60);

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Authenticated,
    RoomResolved,
    MembershipChecked,
    RoomJoined,
    MessageDelivered,
    LoggedOut,
    Failed,
}

/// Drives a single session against a [`MatrixClient`].
///
/// Generic over `C: MatrixClient` so it runs against the HTTP client in
/// production and an in-memory mock in tests. One orchestrator performs one
/// run; [`run`](Self::run) consumes it.
pub struct SessionOrchestrator<C: MatrixClient> {
    client: C,
    config: SessionConfig,
    framer: MessageFramer,
    progress: Box<dyn ProgressSink>,
    state: SessionState,
    room_id: Option<String>,
    teardown_grace: Duration,
}

impl<C: MatrixClient> SessionOrchestrator<C> {
    pub fn new(client: C, config: SessionConfig) -> Self {
        let framer = MessageFramer::new(config.max_chars);
        Self {
            client,
            config,
            framer,
            progress: Box::new(SilentProgress),
            state: SessionState::Idle,
            room_id: None,
            teardown_grace: TEARDOWN_GRACE,
        }
    }

    /// Route verbose progress lines to `sink`.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Override the teardown bound (defaults to [`TEARDOWN_GRACE`]).
    pub fn with_teardown_grace(mut self, grace: Duration) -> Self {
        self.teardown_grace = grace;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the whole pipeline, reading the message from `input`.
    ///
    /// Cancelling `cancel` abandons the pipeline at its current step; only
    /// teardown still runs. The first error encountered is returned as-is;
    /// teardown problems are logged and never replace it.
    pub async fn run<R>(
        mut self,
        mut input: R,
        cancel: CancellationToken,
    ) -> Result<SessionReport, SessionError>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SessionError::Interrupted),
            result = self.pipeline(&mut input) => result,
        };

        if let Err(err) = &result {
            tracing::warn!(state = ?self.state, error = %err, "session aborted");
            self.transition(SessionState::Failed);
        }

        self.teardown().await;
        result
    }

    async fn pipeline<R>(&mut self, input: &mut R) -> Result<SessionReport, SessionError>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        // Classified up front so a bad reference never costs a network call.
        let target = RoomTarget::parse(&self.config.room)?;

        self.authenticate().await?;
        let room_id = self.resolve_room(&target).await?;

        let joined = if self.is_member(&room_id).await? {
            false
        } else {
            self.join(&room_id).await?;
            true
        };

        let delivery = self.framer.deliver(&self.client, &room_id, input).await?;
        self.transition(SessionState::MessageDelivered);
        self.say(&self.framer.summary(delivery, &room_id));

        self.logout().await;

        Ok(SessionReport {
            room_id,
            joined,
            delivery,
        })
    }

    #[tracing::instrument(skip_all, fields(user = %self.config.username, server = %self.config.server))]
    async fn authenticate(&mut self) -> Result<(), SessionError> {
        self.say(&format!(
            "Attempting login for user {} on host {}",
            self.config.username, self.config.server
        ));
        self.client
            .authenticate(&self.config.username, &self.config.password)
            .await?;
        self.transition(SessionState::Authenticated);
        self.say(&format!("Login succeeded for user {}", self.config.username));
        Ok(())
    }

    /// Resolve the target to a room id, at most once per run.
    #[tracing::instrument(skip_all, fields(room = %target))]
    async fn resolve_room(&mut self, target: &RoomTarget) -> Result<String, SessionError> {
        if let Some(room_id) = &self.room_id {
            return Ok(room_id.clone());
        }

        let room_id = match target {
            RoomTarget::Id(id) => id.clone(),
            RoomTarget::Alias(alias) => {
                let room_id = self.client.resolve_alias(alias).await?;
                self.say(&format!("Room alias {alias} resolved to {room_id}"));
                room_id
            }
        };

        self.room_id = Some(room_id.clone());
        self.transition(SessionState::RoomResolved);
        Ok(room_id)
    }

    #[tracing::instrument(skip(self))]
    async fn is_member(&mut self, room_id: &str) -> Result<bool, SessionError> {
        let joined = self.client.joined_rooms().await?.contains(room_id);
        self.transition(SessionState::MembershipChecked);
        self.say(if joined {
            "User has already joined room"
        } else {
            "User has not yet joined room"
        });
        Ok(joined)
    }

    #[tracing::instrument(skip(self))]
    async fn join(&mut self, room_id: &str) -> Result<(), SessionError> {
        self.client.join_room(room_id).await?;
        self.transition(SessionState::RoomJoined);
        self.say("User has joined room now");
        Ok(())
    }

    /// Best-effort: a failed logout is logged but does not fail the run.
    async fn logout(&mut self) {
        match self.client.logout().await {
            Ok(()) => self.transition(SessionState::LoggedOut),
            Err(err) => tracing::warn!(error = %err, "logout failed; leaving session to expire"),
        }
    }

    async fn teardown(&mut self) {
        match tokio::time::timeout(self.teardown_grace, self.client.close()).await {
            Ok(Ok(())) => tracing::debug!("client resources released"),
            Ok(Err(err)) => tracing::warn!(error = %err, "failed to release client resources"),
            Err(_) => tracing::warn!(
                grace_secs = self.teardown_grace.as_secs(),
                "client resources did not shut down in time"
            ),
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    fn say(&self, line: &str) {
        if self.config.verbose {
            self.progress.emit(line);
        }
    }
}
