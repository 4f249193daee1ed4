use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use keybot_types::api::{NotificationRequest, TokenResponse};

/// Scope required to post notifications into a room.
pub const SCOPE_SEND_NOTIFICATION: &str = "send_notification";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// A client that can post notifications into a room.
/// Each installed room gets its own client bound to that room's token.
#[async_trait]
pub trait RoomClient: Send + Sync {
    async fn send_notification(
        &self,
        room_id: &str,
        request: &NotificationRequest,
    ) -> Result<(), ChatError>;
}

/// Unauthenticated entry point to the chat REST API, used during the
/// install handshake to exchange add-on credentials for a token.
#[derive(Clone)]
pub struct HipChat {
    http: Client,
    api_base: String,
}

impl HipChat {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Client-credentials grant: trade the add-on's OAuth id/secret for an
    /// access token limited to `scopes`.
    pub async fn generate_token(
        &self,
        oauth_id: &str,
        oauth_secret: &str,
        scopes: &[&str],
    ) -> Result<TokenResponse, ChatError> {
        let url = format!("{}/oauth/token", self.api_base);
        let scope = scopes.join(" ");
        debug!(%url, %scope, "requesting access token");

        let response = self
            .http
            .post(&url)
            .basic_auth(oauth_id, Some(oauth_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<TokenResponse>().await?)
    }

    /// Build a room client that authenticates with `token`.
    pub fn token_client(&self, token: &TokenResponse) -> TokenClient {
        TokenClient {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            access_token: token.access_token.clone(),
        }
    }
}

/// Room client bound to a single OAuth access token.
pub struct TokenClient {
    http: Client,
    api_base: String,
    access_token: String,
}

#[async_trait]
impl RoomClient for TokenClient {
    async fn send_notification(
        &self,
        room_id: &str,
        request: &NotificationRequest,
    ) -> Result<(), ChatError> {
        let url = format!("{}/room/{}/notification", self.api_base, room_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(ChatError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_drops_trailing_slash() {
        let hc = HipChat::new("https://api.hipchat.com/v2/");
        assert_eq!(hc.api_base(), "https://api.hipchat.com/v2");
    }

    #[test]
    fn status_error_message() {
        let err = ChatError::Status {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(err.to_string(), "chat API returned 401: unauthorized");
    }
}
