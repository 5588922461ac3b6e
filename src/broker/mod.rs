//! The `broker` module defines the contract between the relay and the
//! message broker, and provides an in-process loopback broker implementing
//! both sides of it for the demo binary and the integration tests.
//!
//! The real broker client (connection management, partitioning, offsets) is
//! an external collaborator: outbound records go through the [`Publisher`]
//! trait, inbound records arrive on a delivery task that the subscription
//! side spawns.

pub mod loopback;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::relay::ChatRecord;

pub use loopback::{LoopbackBroker, spawn_delivery};

/// Publish failures, both at enqueue time and as asynchronous outcomes
/// reported through a [`PublishReceipt`].
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("relay is closed")]
    Closed,

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker connection lost")]
    Disconnected,

    #[error("broker rejected record: {0}")]
    Rejected(String),
}

/// Accepts outbound records for asynchronous delivery to the broker.
///
/// `publish` enqueues and returns immediately; the eventual outcome is
/// reported through the returned receipt.
pub trait Publisher: Send + Sync {
    fn publish(&self, record: ChatRecord) -> Result<PublishReceipt, PublishError>;
}

/// The pending outcome of a publish.
///
/// Await [`PublishReceipt::wait`] to observe completion, or drop the receipt
/// for fire-and-forget delivery; failures are then only logged by the
/// publisher.
#[derive(Debug)]
pub struct PublishReceipt {
    outcome: oneshot::Receiver<Result<(), PublishError>>,
}

impl PublishReceipt {
    pub fn new(outcome: oneshot::Receiver<Result<(), PublishError>>) -> Self {
        Self { outcome }
    }

    /// A receipt together with the sender used to resolve it.
    pub fn pending() -> (oneshot::Sender<Result<(), PublishError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::new(rx))
    }

    /// Waits for the asynchronous publish outcome. A publisher that went
    /// away without reporting counts as a lost connection.
    pub async fn wait(self) -> Result<(), PublishError> {
        self.outcome
            .await
            .unwrap_or(Err(PublishError::Disconnected))
    }
}

/// A cancellable broker subscription, handed out at subscribe time and
/// revoked by [`ChatRelay::close`](crate::relay::ChatRelay::close).
pub trait Subscription: Send + Sync {
    fn cancel(&self);
}
