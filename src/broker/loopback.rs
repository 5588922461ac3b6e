use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::broker::{PublishError, PublishReceipt, Publisher, Subscription};
use crate::relay::{ChatRecord, ChatRelay};

/// An in-process broker that loops published records straight back to its
/// subscribers.
///
/// It stands in for the real broker in the demo binary and the tests:
/// records are serialized to JSON on publish and handed to every subscriber
/// of the record's topic over an unbounded channel, so per-topic FIFO holds
/// the way a single broker partition would. Group ids are kept for log
/// context only; one process means one member per group.
#[derive(Debug, Default)]
pub struct LoopbackBroker {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    topics: HashMap<String, HashSet<String>>,
    subscribers: HashMap<String, LoopbackSubscriber>,
}

#[derive(Debug)]
struct LoopbackSubscriber {
    group_id: String,
    sender: UnboundedSender<String>,
}

impl LoopbackBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for `topics` and returns its id together with
    /// the receiving end of its record stream.
    pub fn subscribe(
        &self,
        topics: &[String],
        group_id: &str,
    ) -> (String, UnboundedReceiver<String>) {
        let id = format!("subscriber-{}", uuid::Uuid::new_v4());
        let (tx, rx) = mpsc::unbounded_channel::<String>();

        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.insert(
            id.clone(),
            LoopbackSubscriber {
                group_id: group_id.to_string(),
                sender: tx,
            },
        );
        for topic in topics {
            inner.topics.entry(topic.clone()).or_default().insert(id.clone());
        }
        info!("{id} subscribed to {topics:?} in group '{group_id}'");
        (id, rx)
    }

    /// Drops a subscriber and all its topic registrations. Its record
    /// channel closes once already-delivered records are drained.
    pub fn unsubscribe(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(subscriber) = inner.subscribers.remove(id) {
            info!("{id} unsubscribed from group '{}'", subscriber.group_id);
        }
        for subscribers in inner.topics.values_mut() {
            subscribers.remove(id);
        }
    }
}

impl Publisher for LoopbackBroker {
    fn publish(&self, record: ChatRecord) -> Result<PublishReceipt, PublishError> {
        let text = serde_json::to_string(&record)?;
        let (ack, receipt) = PublishReceipt::pending();

        let inner = self.inner.lock().unwrap();
        if let Some(subscribers) = inner.topics.get(&record.topic) {
            for id in subscribers {
                if let Some(subscriber) = inner.subscribers.get(id) {
                    if let Err(e) = subscriber.sender.send(text.clone()) {
                        error!("failed to deliver to {id}: {e}");
                    }
                } else {
                    error!("no subscriber registered with id: {id}");
                }
            }
        } else {
            debug!("no subscribers for topic '{}'", record.topic);
        }

        // The loopback accepts a record the moment it is fanned to the
        // subscriber channels.
        let _ = ack.send(Ok(()));
        Ok(receipt)
    }
}

struct LoopbackSubscription {
    broker: Arc<LoopbackBroker>,
    id: String,
}

impl Subscription for LoopbackSubscription {
    fn cancel(&self) {
        self.broker.unsubscribe(&self.id);
    }
}

/// Subscribes `relay` to its configured topic set and spawns the delivery
/// task feeding [`ChatRelay::on_record`]. The subscription handle is bound
/// to the relay so `close()` revokes it.
pub fn spawn_delivery(broker: &Arc<LoopbackBroker>, relay: &Arc<ChatRelay>) {
    let topics = relay.config().subscription_topics();
    let (id, mut rx) = broker.subscribe(&topics, relay.config().group_id());

    relay.bind_subscription(Box::new(LoopbackSubscription {
        broker: Arc::clone(broker),
        id,
    }));

    let relay = Arc::clone(relay);
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            match serde_json::from_str::<ChatRecord>(&text) {
                Ok(record) => relay.on_record(record),
                Err(e) => error!("invalid record on the wire: {e} | {text}"),
            }
        }
        debug!("delivery task finished");
    });
}
