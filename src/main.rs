use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::{error, info, warn};

use chatrelay::broker::{LoopbackBroker, spawn_delivery};
use chatrelay::config::load_config;
use chatrelay::relay::{ChatListener, ChatRelay};
use chatrelay::utils::logging;

/// Prints every delivered chat message, prefixed with its room.
struct ConsoleDisplay;

impl ChatListener for ConsoleDisplay {
    fn chat_message(&self, topic: &str, user: &str, message: &str) {
        println!("[{topic}] {user}: {message}");
    }
}

#[tokio::main]
async fn main() {
    logging::init("info");
    let settings = load_config().expect("Failed to load configuration");

    if settings.keystore.is_some() {
        // Loading keystore files is an embedding concern; this demo binary
        // does not carry a store parser and asks for a name instead.
        warn!("keystore configured but not loadable here, falling back to username prompt");
    }

    let broker = Arc::new(LoopbackBroker::new());
    let relay = Arc::new(ChatRelay::new(settings.chat.relay_config(), broker.clone()));

    let user = match relay.username() {
        Some(name) => name.to_string(),
        None => ask_for_username(),
    };

    let display: Arc<dyn ChatListener> = Arc::new(ConsoleDisplay);
    relay.add_listener(Arc::clone(&display));
    spawn_delivery(&broker, &relay);

    let mut topic = relay.config().default_topic().to_string();
    println!("rooms: {:?}", relay.config().subscription_topics());
    println!("type a message, '/room <name>' to switch, '/quit' to leave");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("stdin error: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Some(room) = line.strip_prefix("/room ") {
            topic = room.trim().to_string();
            println!("now talking in '{topic}'");
            continue;
        }
        match relay.send(&topic, &user, line) {
            Ok(receipt) => {
                tokio::spawn(async move {
                    if let Err(e) = receipt.wait().await {
                        error!("publish failed: {e}");
                    }
                });
            }
            Err(e) => error!("send failed: {e}"),
        }
    }

    relay.remove_listener(&display);
    relay.close();
    info!("session ended for user {user}");
}

/// Asks for a username on stdin, until a non-empty one is entered.
fn ask_for_username() -> String {
    let stdin = std::io::stdin();
    loop {
        print!("your user: ");
        std::io::stdout().flush().expect("flush stdout");
        let mut name = String::new();
        if stdin.read_line(&mut name).expect("read username") == 0 {
            // EOF before a name was entered
            panic!("User entered blank or no username");
        }
        let name = name.trim();
        if !name.is_empty() {
            info!("user entered: {name}");
            return name.to_string();
        }
    }
}
