use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.chat.default_topic, "chat");
    assert_eq!(settings.chat.rooms, "chat");
    assert_eq!(settings.chat.group_id, "chatrelay");
    assert!(settings.keystore.is_none());
}

#[test]
fn test_relay_config_splits_rooms() {
    let settings = Settings::default();
    let chat = super::ChatSettings {
        rooms: "general, random,,dev ".to_string(),
        ..settings.chat
    };
    let config = chat.relay_config();
    assert_eq!(config.topics().to_vec(), ["general", "random", "dev"]);
    assert_eq!(config.default_topic(), "chat");
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // Run load_config from a temporary directory so it picks up
    // config/default.toml from there.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [chat]
        default_topic = "lobby"
        rooms = "lobby,random"
        group_id = "relay-1"

        [keystore]
        location = "client.p12"
        kind = "PKCS12"
        store_passphrase = "secret"
        key_passphrase = "secret"
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config().expect("load_config failed");
    assert_eq!(cfg.chat.default_topic, "lobby");
    assert_eq!(cfg.chat.rooms, "lobby,random");
    assert_eq!(cfg.chat.group_id, "relay-1");
    let ks = cfg.keystore.expect("keystore section");
    assert_eq!(ks.location, "client.p12");
    assert_eq!(ks.kind.as_deref(), Some("PKCS12"));

    env::set_current_dir(orig).expect("restore cwd");
}

#[test]
#[serial]
fn load_config_reads_environment() {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    temp_env::with_vars(
        [
            ("CHAT__DEFAULT_TOPIC", Some("lobby")),
            ("CHAT__ROOMS", Some("env-room")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.chat.default_topic, "lobby");
            assert_eq!(cfg.chat.rooms, "env-room");
            // untouched values fall back to defaults
            assert_eq!(cfg.chat.group_id, "chatrelay");
        },
    );

    env::set_current_dir(orig).expect("restore cwd");
}
