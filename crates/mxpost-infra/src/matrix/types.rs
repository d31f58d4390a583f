//! Matrix client-server API request and response bodies.
//!
//! Only the fields mxpost reads or writes are modelled; unknown response
//! fields are ignored. Request types borrow their data and deliberately do
//! not derive `Debug` since the login body carries the password.

use serde::{Deserialize, Serialize};

/// `POST /login` body for password login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub identifier: UserIdentifier<'a>,
    pub password: &'a str,
    pub initial_device_display_name: &'a str,
}

#[derive(Serialize)]
pub struct UserIdentifier<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn password(user: &'a str, password: &'a str, device_name: &'a str) -> Self {
        Self {
            kind: "m.login.password",
            identifier: UserIdentifier {
                kind: "m.id.user",
                user,
            },
            password,
            initial_device_display_name: device_name,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// `GET /directory/room/{alias}` response.
#[derive(Debug, Deserialize)]
pub struct ResolveAliasResponse {
    pub room_id: String,
    #[serde(default)]
    pub servers: Vec<String>,
}

/// `GET /joined_rooms` response.
#[derive(Debug, Deserialize)]
pub struct JoinedRoomsResponse {
    pub joined_rooms: Vec<String>,
}

/// `POST /rooms/{roomId}/join` response.
#[derive(Debug, Deserialize)]
pub struct JoinResponse {
    pub room_id: String,
}

/// `m.room.message` content with `msgtype: m.text`.
#[derive(Debug, Serialize)]
pub struct TextMessage<'a> {
    pub msgtype: &'static str,
    pub body: &'a str,
}

impl<'a> TextMessage<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            msgtype: "m.text",
            body,
        }
    }
}

/// `PUT /rooms/{roomId}/send/...` response.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub event_id: String,
}

/// Body for endpoints that return `{}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Standard Matrix error body.
#[derive(Debug, Deserialize)]
pub struct MatrixErrorBody {
    pub errcode: String,
    #[serde(default)]
    pub error: Option<String>,
}
