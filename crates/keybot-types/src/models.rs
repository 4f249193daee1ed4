use serde::{Deserialize, Serialize};

/// A chat message delivered by the room webhook, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Room id in decimal, the same form used as the registry key.
    pub room_id: String,
    pub sender_id: i64,
    pub mention_name: String,
    pub message: String,
}

/// Key fields pulled out of a set-key message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedKey {
    /// Free-form label from a `type=` token. Empty when none was given.
    pub key_type: String,
    /// Everything from the key marker to the end of the message.
    /// Empty when no marker was found.
    pub material: String,
    pub user_id: i64,
}

impl ExtractedKey {
    pub fn has_material(&self) -> bool {
        !self.material.is_empty()
    }
}

/// A row in the append-only key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub user_id: i64,
    pub key_type: String,
    pub key_text: String,
}

impl From<ExtractedKey> for KeyRecord {
    fn from(key: ExtractedKey) -> Self {
        Self {
            user_id: key.user_id,
            key_type: key.key_type,
            key_text: key.material,
        }
    }
}

/// Notification color as understood by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

/// The message posted back into the room after a triage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub color: Color,
}

impl Reply {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), color: Color::Blue }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), color: Color::Red }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Color::Blue).unwrap(), "\"blue\"");
        assert_eq!(Color::Red.as_str(), "red");
    }

    #[test]
    fn record_from_extracted_key() {
        let key = ExtractedKey {
            key_type: "rsa".into(),
            material: "ssh-rsa AAAA".into(),
            user_id: 42,
        };
        let record = KeyRecord::from(key);
        assert_eq!(record.user_id, 42);
        assert_eq!(record.key_type, "rsa");
        assert_eq!(record.key_text, "ssh-rsa AAAA");
    }
}
