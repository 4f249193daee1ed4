use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use keybot_chat::{Notifier, NotifyError};
use keybot_types::api::{MalformedPayload, WebhookPayload};
use keybot_types::models::{ChatEvent, KeyRecord, Reply};

use crate::extract::{SET_KEY_COMMAND, extract_key};
use crate::store::{KeyStore, StoreError};

pub const BAD_MESSAGE: &str = "Error, bad message";
pub const SAVE_FAILED: &str = "Error saving";

/// How a chat message is recognised as a set-key command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// The message starts with `/set_key`.
    #[default]
    Command,
    /// The message contains `keybot set` anywhere.
    Phrase,
}

impl Trigger {
    pub const PHRASE: &'static str = "keybot set";

    pub fn matches(self, message: &str) -> bool {
        match self {
            Self::Command => message.trim_start().starts_with(SET_KEY_COMMAND),
            Self::Phrase => message.contains(Self::PHRASE),
        }
    }

    /// Regex the chat platform uses to decide which messages to forward.
    pub fn webhook_pattern(self) -> &'static str {
        match self {
            Self::Command => "^/set_key",
            Self::Phrase => "keybot set",
        }
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(Self::Command),
            "phrase" => Ok(Self::Phrase),
            other => Err(format!("unknown trigger '{}', expected 'command' or 'phrase'", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum TriageError {
    #[error(transparent)]
    Malformed(#[from] MalformedPayload),
}

/// What happened to the reply after it was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The room has no installed client; nothing was sent.
    Dropped,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    /// The message carried no trigger.
    Ignored,
    Replied { reply: Reply, delivery: Delivery },
}

/// Runs one webhook event through extraction, storage and notification.
///
/// Every failure is handled here: callers get an outcome, never a panic,
/// and the only error returned is for a payload that could not be decoded.
#[derive(Clone)]
pub struct Triage {
    trigger: Trigger,
    store: Arc<dyn KeyStore>,
    notifier: Notifier,
    store_timeout: Duration,
}

impl Triage {
    pub fn new(
        trigger: Trigger,
        store: Arc<dyn KeyStore>,
        notifier: Notifier,
        store_timeout: Duration,
    ) -> Self {
        Self {
            trigger,
            store,
            notifier,
            store_timeout,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Decode a raw webhook body and triage it.
    pub async fn handle_payload(
        &self,
        body: &[u8],
        cancel: &CancellationToken,
    ) -> Result<TriageOutcome, TriageError> {
        let payload = WebhookPayload::parse(body).inspect_err(|e| {
            warn!(error = %e, "rejecting webhook, no notification sent");
        })?;

        Ok(self.triage(ChatEvent::from(payload), cancel).await)
    }

    pub async fn triage(&self, event: ChatEvent, cancel: &CancellationToken) -> TriageOutcome {
        let span = info_span!(
            "triage",
            triage_id = %Uuid::new_v4(),
            room_id = %event.room_id,
            sender_id = event.sender_id,
        );

        async move {
            let Some(reply) = self.build_reply(&event).await else {
                debug!("no trigger in message, ignoring");
                return TriageOutcome::Ignored;
            };

            let delivery = self.deliver(&event.room_id, &reply, cancel).await;
            TriageOutcome::Replied { reply, delivery }
        }
        .instrument(span)
        .await
    }

    /// Extract and store the key, returning the reply for the room.
    /// `None` when the message is not a set-key command.
    pub async fn build_reply(&self, event: &ChatEvent) -> Option<Reply> {
        if !self.trigger.matches(&event.message) {
            return None;
        }

        let key = extract_key(&event.message, event.sender_id);
        if !key.has_material() {
            warn!(mention_name = %event.mention_name, "set-key message without a recognised key marker");
            return Some(Reply::error(BAD_MESSAGE));
        }

        info!(
            mention_name = %event.mention_name,
            key_type = %key.key_type,
            "saving key"
        );

        let reply = match self.save(KeyRecord::from(key)).await {
            Ok(rows) => Reply::success(format!("Added = {} key", rows)),
            Err(e) => {
                error!(error = %e, "failed to save key");
                Reply::error(SAVE_FAILED)
            }
        };
        Some(reply)
    }

    async fn save(&self, record: KeyRecord) -> Result<usize, StoreError> {
        tokio::time::timeout(self.store_timeout, self.store.save(record))
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }

    /// One notification attempt. A cancelled request abandons the attempt;
    /// the key write before it is not rolled back.
    async fn deliver(&self, room_id: &str, reply: &Reply, cancel: &CancellationToken) -> Delivery {
        if cancel.is_cancelled() {
            warn!("request cancelled before notification");
            return Delivery::Cancelled;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("request cancelled during notification");
                return Delivery::Cancelled;
            }
            result = self.notifier.notify(room_id, reply) => result,
        };

        match result {
            Ok(()) => {
                info!(color = reply.color.as_str(), "notification sent");
                Delivery::Sent
            }
            Err(NotifyError::UnregisteredRoom(_)) => {
                // The sender gets no feedback in this case.
                warn!("room is not registered, dropping notification");
                Delivery::Dropped
            }
            Err(e) => {
                error!(error = %e, "failed to notify room");
                Delivery::Failed
            }
        }
    }
}
