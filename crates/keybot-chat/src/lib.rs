pub mod client;
pub mod notifier;
pub mod registry;

pub use client::{ChatError, HipChat, RoomClient, TokenClient};
pub use notifier::{Notifier, NotifyError};
pub use registry::RoomRegistry;
