//! HttpMatrixClient -- concrete [`MatrixClient`] over the Matrix
//! client-server API (v3).
//!
//! Each trait operation is a single HTTP request. Non-2xx responses are
//! parsed as Matrix error bodies and surfaced as [`ClientError::Protocol`];
//! connection and timeout failures surface as [`ClientError::Transport`].
//!
//! The access token is wrapped in [`secrecy::SecretString`] and is never
//! logged or included in `Debug` output.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use mxpost_core::client::MatrixClient;
use mxpost_types::error::ClientError;

use super::types::{
    Empty, JoinResponse, JoinedRoomsResponse, LoginRequest, LoginResponse, MatrixErrorBody,
    ResolveAliasResponse, SendResponse, TextMessage,
};

/// Matrix homeserver client.
///
/// Holds the HTTP connection pool and, after login, the access token. Both
/// are dropped by [`close`](MatrixClient::close); any call after that fails
/// with [`ClientError::Closed`].
pub struct HttpMatrixClient {
    http: Option<reqwest::Client>,
    base_url: Url,
    access_token: Option<SecretString>,
    user_id: Option<String>,
}

impl HttpMatrixClient {
    const API_PREFIX: [&'static str; 3] = ["_matrix", "client", "v3"];

    /// Display name given to the device created at login.
    const DEVICE_NAME: &'static str = "mxpost";

    /// Per-request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the homeserver at `base_url`.
    pub fn new(base_url: Url) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("mxpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create reqwest client");

        Self {
            http: Some(http),
            base_url,
            access_token: None,
            user_id: None,
        }
    }

    /// Fully qualified user id of the logged-in account.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build an API URL; each segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Transport(format!("invalid homeserver URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(Self::API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn http(&self) -> Result<&reqwest::Client, ClientError> {
        self.http.as_ref().ok_or(ClientError::Closed)
    }

    /// Start a request carrying the access token.
    fn authed(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let http = self.http()?;
        let token = self.access_token.as_ref().ok_or(ClientError::NotLoggedIn)?;
        Ok(http
            .request(method, self.endpoint(segments)?)
            .bearer_auth(token.expose_secret()))
    }

    async fn call<B, T>(&self, request: RequestBuilder, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(protocol_error(status.as_u16(), &error_body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// Map a non-2xx response to a protocol error, keeping the server's errcode.
fn protocol_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<MatrixErrorBody>(body) {
        Ok(parsed) => ClientError::Protocol {
            status,
            message: parsed.error.unwrap_or_else(|| format!("HTTP {status}")),
            errcode: parsed.errcode,
        },
        Err(_) => ClientError::Protocol {
            status,
            errcode: "M_UNKNOWN".to_string(),
            message: if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {}", body.trim())
            },
        },
    }
}

// HttpMatrixClient does not derive Debug; the token stays out of any output.

impl MatrixClient for HttpMatrixClient {
    async fn authenticate(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), ClientError> {
        let request = self.http()?.post(self.endpoint(&["login"])?);
        let body = LoginRequest::password(username, password.expose_secret(), Self::DEVICE_NAME);

        let login: LoginResponse = self.call(request, Some(&body)).await?;

        tracing::debug!(
            user_id = %login.user_id,
            device_id = login.device_id.as_deref().unwrap_or("-"),
            "logged in"
        );
        self.access_token = Some(SecretString::from(login.access_token));
        self.user_id = Some(login.user_id);
        Ok(())
    }

    async fn resolve_alias(&self, alias: &str) -> Result<String, ClientError> {
        let request = self.authed(Method::GET, &["directory", "room", alias])?;
        let resolved: ResolveAliasResponse = self.call::<Empty, _>(request, None).await?;
        tracing::debug!(alias, room_id = %resolved.room_id, servers = ?resolved.servers, "resolved alias");
        Ok(resolved.room_id)
    }

    async fn joined_rooms(&self) -> Result<HashSet<String>, ClientError> {
        let request = self.authed(Method::GET, &["joined_rooms"])?;
        let joined: JoinedRoomsResponse = self.call::<Empty, _>(request, None).await?;
        Ok(joined.joined_rooms.into_iter().collect())
    }

    async fn join_room(&self, room_id: &str) -> Result<(), ClientError> {
        let request = self.authed(Method::POST, &["rooms", room_id, "join"])?;
        let joined: JoinResponse = self.call(request, Some(&Empty {})).await?;
        tracing::debug!(room_id = %joined.room_id, "joined room");
        Ok(())
    }

    async fn send_message(&self, room_id: &str, body: &str) -> Result<(), ClientError> {
        let txn_id = uuid::Uuid::now_v7().to_string();
        let request = self.authed(
            Method::PUT,
            &["rooms", room_id, "send", "m.room.message", &txn_id],
        )?;
        let sent: SendResponse = self.call(request, Some(&TextMessage::new(body))).await?;
        tracing::debug!(room_id, event_id = %sent.event_id, "message sent");
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        let request = self.authed(Method::POST, &["logout"])?;
        let _: Empty = self.call(request, Some(&Empty {})).await?;
        self.access_token = None;
        tracing::debug!("logged out");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.access_token = None;
        if self.http.take().is_some() {
            tracing::debug!("http client released");
        }
        Ok(())
    }
}
