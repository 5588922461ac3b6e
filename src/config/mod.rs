mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ChatSettings, KeystoreSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the chat and keystore configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    // "__" keeps keys that contain underscores addressable from the
    // environment, e.g. CHAT__DEFAULT_TOPIC -> chat.default_topic
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        chat: ChatSettings {
            default_topic: partial
                .chat
                .as_ref()
                .and_then(|c| c.default_topic.clone())
                .unwrap_or(default.chat.default_topic),
            rooms: partial
                .chat
                .as_ref()
                .and_then(|c| c.rooms.clone())
                .unwrap_or(default.chat.rooms),
            group_id: partial
                .chat
                .as_ref()
                .and_then(|c| c.group_id.clone())
                .unwrap_or(default.chat.group_id),
        },
        keystore: partial.keystore,
    })
}

#[cfg(test)]
mod tests;
