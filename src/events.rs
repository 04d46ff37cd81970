//! Two event topics broadcast to in-process subscribers: `BlockAdded` and
//! `TransactionAdded`. Backed by `tokio::sync::broadcast`, a bounded
//! primitive: a lagging subscriber misses the oldest unread events rather
//! than blocking the publisher, which this node tolerates (the consensus
//! loop repairs any resulting divergence).

use tokio::sync::broadcast;

use crate::model::{Block, Transaction};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum Event {
    BlockAdded(Block),
    TransactionAdded(Transaction),
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        EventBus { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publishers never block: a full channel with no readers simply drops
    /// the event (there were no subscribers to miss it).
    pub fn publish(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
