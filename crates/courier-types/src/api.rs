use serde::{Deserialize, Serialize};

use crate::models::Message;

// -- JWT Claims --

/// Bearer token claims. `sub` holds the user id as a decimal string so the
/// id is never round-tripped through a JSON float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Users --

/// Body of both `POST /users` and `POST /login`. Extra fields are ignored.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub token: String,
}

// -- Messages --

/// Inbound message body. Every field defaults so that missing input is
/// reported by validation rather than by the JSON decoder.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub sender: i64,
    #[serde(default)]
    pub recipient: i64,
    #[serde(default)]
    pub content: ContentRequest,
}

/// Flat, untyped content as sent by clients. Turned into a
/// [`MessageDetail`](crate::models::MessageDetail) by the validator.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub width: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub height: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// Raw query string of `GET /messages`; parsed by the validator.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GetMessagesQuery {
    pub recipient: Option<String>,
    pub start: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    pub messages: Vec<Message>,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub health: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
