use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::client::RoomClient;

/// Installed rooms: room id (decimal string) -> notification client.
///
/// Entries are written by the install handshake and read on every
/// notification. A re-install replaces the previous client. There is no
/// removal; rooms live until the process exits.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, Arc<dyn RoomClient>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, room_id: impl Into<String>, client: Arc<dyn RoomClient>) {
        let room_id = room_id.into();
        let replaced = self
            .rooms
            .write()
            .await
            .insert(room_id.clone(), client)
            .is_some();

        if replaced {
            info!(room_id = %room_id, "room re-installed, credentials replaced");
        } else {
            info!(room_id = %room_id, "room registered");
        }
    }

    pub async fn lookup(&self, room_id: &str) -> Option<Arc<dyn RoomClient>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn room_ids(&self) -> Vec<String> {
        self.rooms.read().await.keys().cloned().collect()
    }
}
