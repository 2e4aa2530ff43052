//! Server-sent events hub
//!
//! A process-wide broadcast channel connecting the publish endpoint to
//! every open event stream. Slow subscribers lag and skip rather than
//! backing up the publisher.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// One message fanned out to all subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub event: String,
    pub data: serde_json::Value,
}

#[derive(Clone)]
pub struct SseHub {
    sender: broadcast::Sender<BroadcastMessage>,
}

impl SseHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fan a message out, returning how many subscribers received it
    pub fn publish(&self, message: BroadcastMessage) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.sender.subscribe()
    }
}

impl Default for SseHub {
    fn default() -> Self {
        Self::new(64)
    }
}
