//! The `relay` module is the core of the application: it owns the registry
//! of chat listeners, publishes outbound messages to the room's broker
//! topic, and fans records delivered by the broker out to every registered
//! listener.

pub mod engine;
pub mod record;
pub mod registry;

pub use engine::{ChatRelay, RelayConfig};
pub use record::{ChatRecord, MISSING};
pub use registry::{ChatListener, ListenerRegistry};
