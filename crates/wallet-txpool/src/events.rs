//! # Pool Events
//!
//! Notifications emitted by the pool, delivered over a
//! `tokio::sync::broadcast` channel.
//!
//! | Event | Emitted when |
//! |-------|--------------|
//! | `Ready` | Bulk replay from storage finished |
//! | `Updated` | The unspent index changed |
//! | `Received` | A new relevant transaction was fully processed |
//! | `Error` | A storage write, delete or scan failed |
//!
//! Subscribers only see events published after they subscribed.

use crate::domain::{Hash, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// Initial load completed.
    Ready { last_ts: Timestamp },
    /// Unspent outputs were added or consumed by `tx_hash`.
    Updated { last_ts: Timestamp, tx_hash: Hash },
    /// A new relevant transaction was ingested.
    Received { tx_hash: Hash },
    /// Storage fault. In-memory state is unaffected.
    Error { message: String },
}

impl PoolEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Updated { .. } => "updated",
            Self::Received { .. } => "received",
            Self::Error { .. } => "error",
        }
    }
}

/// In-memory event bus for one pool.
#[derive(Debug)]
pub struct PoolEventBus {
    sender: broadcast::Sender<PoolEvent>,
    events_published: AtomicU64,
}

impl PoolEventBus {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning the number of receivers.
    pub fn publish(&self, event: PoolEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(event = name, "[txpool] Event dropped (no receivers)");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for PoolEventBus {
    fn default() -> Self {
        Self::with_capacity(crate::domain::DEFAULT_EVENT_CAPACITY)
    }
}
