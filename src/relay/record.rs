use serde::{Deserialize, Serialize};

/// Placeholder substituted for an absent sender or body on receipt.
pub const MISSING: &str = "???";

/// A single chat message as it crosses the broker.
///
/// The topic is the room identity and is treated as an opaque key; it is
/// never validated against the configured room list, so a record for an
/// unconfigured room is still sent and delivered. Key (sender) and value
/// (body) may be absent on the wire; the relay normalizes them to `"???"`
/// during fan-out.
///
/// This structure is serialized to and from JSON for the broker wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub topic: String,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl ChatRecord {
    pub fn new(topic: &str, key: &str, value: &str) -> Self {
        Self {
            topic: topic.to_string(),
            key: Some(key.to_string()),
            value: Some(value.to_string()),
        }
    }

    /// The sender identity, `"???"` if absent.
    pub fn user(&self) -> &str {
        self.key.as_deref().unwrap_or(MISSING)
    }

    /// The message body, `"???"` if absent.
    pub fn message(&self) -> &str {
        self.value.as_deref().unwrap_or(MISSING)
    }
}
