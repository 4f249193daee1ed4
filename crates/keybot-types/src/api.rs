use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChatEvent, Color};

// -- Room webhook --

/// Body of a `room_message` webhook. Only the fields the bot reads are
/// modelled; everything else the platform sends is ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub item: WebhookItem,
}

#[derive(Debug, Deserialize)]
pub struct WebhookItem {
    pub room: WebhookRoom,
    pub message: WebhookMessage,
}

#[derive(Debug, Deserialize)]
pub struct WebhookRoom {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub message: String,
    pub from: WebhookSender,
}

#[derive(Debug, Deserialize)]
pub struct WebhookSender {
    pub id: i64,
    pub mention_name: String,
}

/// The webhook body did not match the expected shape.
#[derive(Debug, Error)]
#[error("malformed webhook payload: {0}")]
pub struct MalformedPayload(pub String);

impl WebhookPayload {
    /// Decode and validate a raw webhook body.
    pub fn parse(body: &[u8]) -> Result<Self, MalformedPayload> {
        serde_json::from_slice(body).map_err(|e| MalformedPayload(e.to_string()))
    }
}

impl From<WebhookPayload> for ChatEvent {
    fn from(payload: WebhookPayload) -> Self {
        let WebhookItem { room, message } = payload.item;
        Self {
            room_id: room.id.to_string(),
            sender_id: message.from.id,
            mention_name: message.from.mention_name,
            message: message.message,
        }
    }
}

// -- Install handshake --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    pub oauth_id: String,
    pub oauth_secret: String,
    pub room_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub capabilities_url: Option<String>,
}

/// Response of the client-credentials token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize)]
pub struct NotificationRequest {
    pub message: String,
    pub message_format: String,
    pub color: Color,
}

impl NotificationRequest {
    pub fn html(message: impl Into<String>, color: Color) -> Self {
        Self {
            message: message.into(),
            message_format: "html".into(),
            color,
        }
    }
}
