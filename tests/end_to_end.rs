use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatrelay::broker::{LoopbackBroker, spawn_delivery};
use chatrelay::identity::MemoryKeystore;
use chatrelay::relay::{ChatListener, ChatRelay, RelayConfig};

/// Collects every delivered triple.
#[derive(Default)]
struct Transcript {
    messages: Mutex<Vec<(String, String, String)>>,
}

impl Transcript {
    fn messages(&self) -> Vec<(String, String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl ChatListener for Transcript {
    fn chat_message(&self, topic: &str, user: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), user.to_string(), message.to_string()));
    }
}

fn config(default_topic: &str, rooms: &[&str]) -> RelayConfig {
    RelayConfig::new(
        default_topic,
        rooms.iter().map(|r| r.to_string()).collect(),
        "e2e-group",
    )
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn send_is_echoed_back_to_the_sender_exactly_once() {
    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(
        config("general", &["general", "random"]),
        broker.clone(),
    ));
    let transcript = Arc::new(Transcript::default());
    relay.add_listener(transcript.clone());
    spawn_delivery(&broker, &relay);

    relay.send("general", "u1", "hello").unwrap().wait().await.unwrap();
    settle().await;

    assert_eq!(
        transcript.messages(),
        vec![(
            "general".to_string(),
            "u1".to_string(),
            "hello".to_string()
        )]
    );
}

#[tokio::test]
async fn listeners_receive_records_for_every_room() {
    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(
        config("general", &["general", "random"]),
        broker.clone(),
    ));
    let transcript = Arc::new(Transcript::default());
    relay.add_listener(transcript.clone());
    spawn_delivery(&broker, &relay);

    // The listener's "active room" is a UI concept; the relay fans every
    // record out to every listener.
    relay.send("random", "u2", "yo").unwrap();
    settle().await;

    assert_eq!(
        transcript.messages(),
        vec![("random".to_string(), "u2".to_string(), "yo".to_string())]
    );
}

#[tokio::test]
async fn default_topic_works_even_when_not_configured() {
    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(
        config("lobby", &["general", "random"]),
        broker.clone(),
    ));
    let transcript = Arc::new(Transcript::default());
    relay.add_listener(transcript.clone());
    spawn_delivery(&broker, &relay);

    relay.send("lobby", "u1", "anyone here?").unwrap();
    settle().await;

    assert_eq!(transcript.messages().len(), 1);
    assert_eq!(transcript.messages()[0].0, "lobby");
}

#[tokio::test]
async fn certificate_identity_flows_into_sent_records() {
    let broker = Arc::new(LoopbackBroker::new());
    let keystore =
        MemoryKeystore::new().with_private_key("client", "OU=Chat,CN=alice,O=Example", "");
    let relay = Arc::new(
        ChatRelay::with_keystore(config("general", &["general"]), broker.clone(), &keystore, None)
            .unwrap(),
    );
    assert_eq!(relay.username(), Some("alice"));

    let transcript = Arc::new(Transcript::default());
    relay.add_listener(transcript.clone());
    spawn_delivery(&broker, &relay);

    let user = relay.username().unwrap().to_string();
    relay.send("general", &user, "hi from my cert").unwrap();
    settle().await;

    assert_eq!(
        transcript.messages(),
        vec![(
            "general".to_string(),
            "alice".to_string(),
            "hi from my cert".to_string()
        )]
    );
}

#[tokio::test]
async fn detached_listener_stops_receiving() {
    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(config("general", &["general"]), broker.clone()));
    let staying = Arc::new(Transcript::default());
    let leaving = Arc::new(Transcript::default());
    let leaving_dyn: Arc<dyn ChatListener> = leaving.clone();
    relay.add_listener(staying.clone());
    relay.add_listener(leaving_dyn.clone());
    spawn_delivery(&broker, &relay);

    relay.send("general", "u1", "first").unwrap();
    settle().await;
    relay.remove_listener(&leaving_dyn);
    relay.send("general", "u1", "second").unwrap();
    settle().await;

    assert_eq!(staying.messages().len(), 2);
    assert_eq!(leaving.messages().len(), 1);
}

#[tokio::test]
async fn closed_relay_rejects_sends_and_stops_delivery() {
    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(config("general", &["general"]), broker.clone()));
    let transcript = Arc::new(Transcript::default());
    relay.add_listener(transcript.clone());
    spawn_delivery(&broker, &relay);

    relay.send("general", "u1", "before").unwrap();
    settle().await;
    relay.close();

    assert!(relay.send("general", "u1", "after").is_err());

    // A publish from elsewhere no longer reaches the closed relay.
    use chatrelay::broker::Publisher;
    use chatrelay::relay::ChatRecord;
    broker
        .publish(ChatRecord::new("general", "u2", "too late"))
        .unwrap();
    settle().await;

    assert_eq!(transcript.messages().len(), 1);
}
