use std::sync::Arc;

use keybot_chat::{HipChat, RoomRegistry};

use crate::triage::Triage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub triage: Triage,
    pub registry: RoomRegistry,
    pub hipchat: HipChat,
    /// Public URL the chat platform reaches this add-on at.
    pub base_url: String,
}
