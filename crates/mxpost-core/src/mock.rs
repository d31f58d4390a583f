//! In-memory `MatrixClient` and `ProgressSink` that record every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;

use mxpost_types::error::ClientError;

use crate::client::MatrixClient;
use crate::progress::ProgressSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate(String),
    ResolveAlias(String),
    JoinedRooms,
    JoinRoom(String),
    SendMessage(String, String),
    Logout,
    Close,
}

/// Operation names accepted by [`MockClient::failing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Authenticate,
    ResolveAlias,
    JoinedRooms,
    JoinRoom,
    SendMessage,
    Logout,
    Close,
}

#[derive(Default)]
pub struct MockClient {
    calls: Arc<Mutex<Vec<Call>>>,
    aliases: HashMap<String, String>,
    joined: HashSet<String>,
    failures: HashMap<Op, ClientError>,
    close_delay: Option<Duration>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, alias: &str, room_id: &str) -> Self {
        self.aliases.insert(alias.to_string(), room_id.to_string());
        self
    }

    pub fn with_joined(mut self, room_id: &str) -> Self {
        self.joined.insert(room_id.to_string());
        self
    }

    pub fn failing(mut self, op: Op, error: ClientError) -> Self {
        self.failures.insert(op, error);
        self
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    /// Shared handle to the call log; stays valid after the client is moved.
    pub fn log(&self) -> CallLog {
        CallLog(Arc::clone(&self.calls))
    }

    fn record(&self, op: Op, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendMessage(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }
}

pub fn forbidden() -> ClientError {
    ClientError::Protocol {
        status: 403,
        errcode: "M_FORBIDDEN".to_string(),
        message: "Invalid username or password".to_string(),
    }
}

impl MatrixClient for MockClient {
    async fn authenticate(
        &mut self,
        username: &str,
        _password: &SecretString,
    ) -> Result<(), ClientError> {
        self.record(Op::Authenticate, Call::Authenticate(username.to_string()))
    }

    async fn resolve_alias(&self, alias: &str) -> Result<String, ClientError> {
        self.record(Op::ResolveAlias, Call::ResolveAlias(alias.to_string()))?;
        self.aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| ClientError::Protocol {
                status: 404,
                errcode: "M_NOT_FOUND".to_string(),
                message: format!("Room alias {alias} not found"),
            })
    }

    async fn joined_rooms(&self) -> Result<HashSet<String>, ClientError> {
        self.record(Op::JoinedRooms, Call::JoinedRooms)?;
        Ok(self.joined.clone())
    }

    async fn join_room(&self, room_id: &str) -> Result<(), ClientError> {
        self.record(Op::JoinRoom, Call::JoinRoom(room_id.to_string()))
    }

    async fn send_message(&self, room_id: &str, body: &str) -> Result<(), ClientError> {
        self.record(
            Op::SendMessage,
            Call::SendMessage(room_id.to_string(), body.to_string()),
        )
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        self.record(Op::Logout, Call::Logout)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        let result = self.record(Op::Close, Call::Close);
        if let Some(delay) = self.close_delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

/// Collects progress lines for assertions.
#[derive(Clone, Default)]
pub struct RecordingProgress(Arc<Mutex<Vec<String>>>);

impl RecordingProgress {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}
