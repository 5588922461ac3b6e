use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::broker::{PublishError, PublishReceipt, Publisher, Subscription};
use crate::identity::{IdentityError, Keystore, resolve_identity};
use crate::relay::record::ChatRecord;
use crate::relay::registry::{ChatListener, ListenerRegistry};

/// Immutable relay configuration, set once at construction.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    default_topic: String,
    topics: Vec<String>,
    group_id: String,
}

impl RelayConfig {
    pub fn new(default_topic: &str, topics: Vec<String>, group_id: &str) -> Self {
        Self {
            default_topic: default_topic.to_string(),
            topics,
            group_id: group_id.to_string(),
        }
    }

    pub fn default_topic(&self) -> &str {
        &self.default_topic
    }

    /// The configured room topics, in configuration order. May be empty and
    /// may contain duplicates; the list is advisory, not a whitelist.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The topics to subscribe to: the configured rooms plus the default
    /// topic, appended if it is not already among them. Sending and
    /// receiving on the default topic works whether or not it was
    /// explicitly configured.
    pub fn subscription_topics(&self) -> Vec<String> {
        let mut topics = self.topics.clone();
        if !topics.contains(&self.default_topic) {
            topics.push(self.default_topic.clone());
        }
        topics
    }
}

/// The broker-backed chat relay.
///
/// Owns the listener registry and the publishing side of the broker
/// contract. Outbound messages go through [`ChatRelay::send`]; inbound
/// records arrive on the broker's delivery task via [`ChatRelay::on_record`]
/// and are fanned out synchronously to every registered listener. The relay
/// is shared by reference (`Arc`) between UI sessions and the delivery task;
/// the registry is its only shared mutable state.
pub struct ChatRelay {
    config: RelayConfig,
    username: Option<String>,
    registry: ListenerRegistry,
    publisher: Arc<dyn Publisher>,
    closed: AtomicBool,
    subscription: Mutex<Option<Box<dyn Subscription>>>,
}

impl ChatRelay {
    /// Creates a relay without a certificate-derived identity. Sessions must
    /// obtain a username interactively.
    pub fn new(config: RelayConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            config,
            username: None,
            registry: ListenerRegistry::new(),
            publisher,
            closed: AtomicBool::new(false),
            subscription: Mutex::new(None),
        }
    }

    /// Creates a relay whose username is derived from the keystore's
    /// private-key certificate. Fails closed when the keystore holds no
    /// usable identity, so misconfiguration is never masked.
    pub fn with_keystore(
        config: RelayConfig,
        publisher: Arc<dyn Publisher>,
        keystore: &dyn Keystore,
        key_passphrase: Option<&str>,
    ) -> Result<Self, IdentityError> {
        let username = resolve_identity(keystore, key_passphrase)?;
        info!("username set to client certificate's subject CN: {username}");
        let mut relay = Self::new(config, publisher);
        relay.username = Some(username);
        Ok(relay)
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The certificate-derived username; `None` means no certificate was
    /// configured and the session has to ask the user.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Registers a listener for chat events. Idempotent.
    pub fn add_listener(&self, listener: Arc<dyn ChatListener>) {
        self.registry.add(listener);
    }

    /// Removes a listener. Safe to call for a listener that was never added
    /// or is already removed.
    pub fn remove_listener(&self, listener: &Arc<dyn ChatListener>) {
        self.registry.remove(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Publishes a chat message, with `user` as the record key and `message`
    /// as its value.
    ///
    /// Returns as soon as the record is handed to the publisher; await the
    /// receipt to observe the asynchronous outcome, or drop it for
    /// fire-and-forget. The relay never retries a failed publish.
    pub fn send(
        &self,
        topic: &str,
        user: &str,
        message: &str,
    ) -> Result<PublishReceipt, PublishError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }
        info!("{user} sending message \"{message}\" on topic '{topic}'");
        self.publisher.publish(ChatRecord::new(topic, user, message))
    }

    /// Handles one record delivered by the broker subscription.
    ///
    /// Runs on the delivery task and fans out synchronously, in registration
    /// order, back-pressuring the subscription while listeners run. An
    /// absent key or value is normalized to `"???"`. A panicking listener is
    /// caught and logged so the remaining listeners still get the record.
    pub fn on_record(&self, record: ChatRecord) {
        let topic = record.topic.as_str();
        let user = record.user();
        let message = record.message();
        info!("received record with key '{user}' and value '{message}' on topic '{topic}'");

        for listener in self.registry.snapshot() {
            let delivery = catch_unwind(AssertUnwindSafe(|| {
                listener.chat_message(topic, user, message);
            }));
            if delivery.is_err() {
                error!("listener panicked while handling a record on topic '{topic}'");
            }
        }
    }

    /// Binds the broker subscription handle revoked by [`ChatRelay::close`].
    pub fn bind_subscription(&self, subscription: Box<dyn Subscription>) {
        *self.subscription.lock().unwrap() = Some(subscription);
    }

    /// Closes the relay: cancels the broker subscription and makes further
    /// `send` calls fail with [`PublishError::Closed`]. Idempotent. Records
    /// already in flight may still fan out while the delivery channel
    /// drains.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = self.subscription.lock().unwrap().take() {
            subscription.cancel();
        }
        info!("relay closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("config", &self.config)
            .field("username", &self.username)
            .field("listeners", &self.registry.len())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
