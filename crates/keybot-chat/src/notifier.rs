use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use keybot_types::api::NotificationRequest;
use keybot_types::models::Reply;

use crate::client::ChatError;
use crate::registry::RoomRegistry;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("room {0} is not registered")]
    UnregisteredRoom(String),
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] ChatError),
}

/// Posts replies into rooms using the clients held by the registry.
#[derive(Clone)]
pub struct Notifier {
    registry: RoomRegistry,
    timeout: Duration,
}

impl Notifier {
    pub fn new(registry: RoomRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Single delivery attempt, no retry. Fails without sending when the
    /// room was never installed.
    pub async fn notify(&self, room_id: &str, reply: &Reply) -> Result<(), NotifyError> {
        let client = self
            .registry
            .lookup(room_id)
            .await
            .ok_or_else(|| NotifyError::UnregisteredRoom(room_id.to_string()))?;

        let request = NotificationRequest::html(reply.message.clone(), reply.color);
        debug!(room_id, color = reply.color.as_str(), "sending notification");

        tokio::time::timeout(self.timeout, client.send_notification(room_id, &request))
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))??;

        Ok(())
    }
}
