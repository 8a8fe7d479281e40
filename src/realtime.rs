//! Board-scoped realtime events backed by a `tokio::sync::broadcast` channel.
//!
//! Events only drive UI refresh. Emitting never fails the caller and nothing
//! relies on delivery.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// A card or column lifecycle event, e.g. `card.moved`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    /// Dot-separated event name
    pub event: String,
    /// The board room this event is delivered to
    pub board_id: Uuid,
    pub payload: serde_json::Value,
}

/// In-process fan-out hub shared via `Arc<BoardEvents>`.
pub struct BoardEvents {
    sender: broadcast::Sender<BoardEvent>,
}

impl BoardEvents {
    /// When the buffer is full, slow subscribers skip the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes to every subscriber of the board; dropped silently when nobody listens.
    pub fn emit<T: Serialize>(&self, event: &str, board_id: Uuid, payload: &T) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(event, board_id = %board_id, error = %e, "Failed to serialize realtime payload");
                return;
            }
        };
        let _ = self.sender.send(BoardEvent {
            event: event.to_string(),
            board_id,
            payload,
        });
    }

    /// Joins the room of one board.
    pub fn subscribe(&self, board_id: Uuid) -> BoardSubscription {
        BoardSubscription {
            board_id,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for BoardEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Receiver that only yields events of its board.
pub struct BoardSubscription {
    board_id: Uuid,
    receiver: broadcast::Receiver<BoardEvent>,
}

impl BoardSubscription {
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// Waits for the next event of this board. Returns `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<BoardEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.board_id == self.board_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(board_id = %self.board_id, skipped, "Realtime subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next already-buffered event of this board without waiting.
    pub fn try_recv(&mut self) -> Option<BoardEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.board_id == self.board_id => return Some(event),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
