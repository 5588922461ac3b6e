use std::sync::{Arc, RwLock};

/// A chat-event consumer, registered with the relay by the UI session layer.
///
/// Invoked synchronously during fan-out, on the broker's delivery task, so
/// implementations must be fast and non-blocking. Every registered listener
/// sees every record regardless of topic; filtering by room is the
/// listener's responsibility.
pub trait ChatListener: Send + Sync {
    fn chat_message(&self, topic: &str, user: &str, message: &str);
}

/// The set of registered listeners.
///
/// Listeners are keyed by identity (`Arc::ptr_eq`), so adding the same
/// listener twice never causes duplicate delivery, and removing one that was
/// never added is a no-op. Registration happens from UI-session tasks while
/// delivery iterates from the broker task; `snapshot` hands the fan-out loop
/// its own copy so a concurrent add or remove never mutates the sequence
/// being iterated.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn ChatListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Idempotent: a listener already present is not
    /// added again.
    pub fn add(&self, listener: Arc<dyn ChatListener>) {
        let mut listeners = self.listeners.write().unwrap();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Removes a listener. No-op if it was never added or already removed.
    pub fn remove(&self, listener: &Arc<dyn ChatListener>) {
        let mut listeners = self.listeners.write().unwrap();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// The current listeners, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn ChatListener>> {
        self.listeners.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
