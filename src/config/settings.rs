use serde::Deserialize;

use crate::relay::RelayConfig;

/// Top-level configuration settings for the application.
///
/// Includes the chat/room settings and the optional keystore settings used
/// for certificate-derived usernames.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub chat: ChatSettings,
    pub keystore: Option<KeystoreSettings>,
}

/// Configuration settings for the chat relay.
///
/// Defines the default room topic, the comma-separated room list and the
/// consumer group id used when subscribing to the broker.
#[derive(Debug, Deserialize, Clone)]
pub struct ChatSettings {
    pub default_topic: String,
    pub rooms: String,
    pub group_id: String,
}

/// Configuration settings for the TLS client keystore.
///
/// When this section is absent, no certificate identity is derived and the
/// application falls back to asking for a username. Loading the store at
/// `location` is the embedding application's job; the relay core only
/// consumes an already-loaded [`Keystore`](crate::identity::Keystore).
#[derive(Debug, Deserialize, Clone)]
pub struct KeystoreSettings {
    pub location: String,
    pub kind: Option<String>,
    pub store_passphrase: Option<String>,
    pub key_passphrase: Option<String>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub chat: Option<PartialChatSettings>,
    pub keystore: Option<KeystoreSettings>,
}

/// Partial chat settings.
///
/// Used when loading chat configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialChatSettings {
    pub default_topic: Option<String>,
    pub rooms: Option<String>,
    pub group_id: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            chat: ChatSettings {
                default_topic: "chat".to_string(),
                rooms: "chat".to_string(),
                group_id: "chatrelay".to_string(),
            },
            keystore: None,
        }
    }
}

impl ChatSettings {
    /// Builds the relay configuration from these settings, splitting the
    /// comma-separated room list into individual topics. Empty segments are
    /// dropped, surrounding whitespace is trimmed.
    pub fn relay_config(&self) -> RelayConfig {
        let topics = self
            .rooms
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        RelayConfig::new(&self.default_topic, topics, &self.group_id)
    }
}
