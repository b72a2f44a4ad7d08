//! Topic-based event bus implementation.

use std::collections::HashMap;

use tokio::sync::broadcast;

use super::types::{ChangeReason, SoulEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Soul point and maximum changes from deaths, kills and commands
    Points,
    /// Death penalties and pending drops
    Penalty,
    /// Changes made by the recovery scheduler
    Recovery,
}

impl SoulEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SoulEvent::CounterChanged(change) if change.reason == ChangeReason::Recovery => {
                Topic::Recovery
            }
            SoulEvent::CounterChanged(_) => Topic::Points,
            SoulEvent::DeathPenaltyApplied(_) | SoulEvent::DropsReleased { .. } => Topic::Penalty,
        }
    }
}

/// Topic-based event bus
///
/// Channels are created up front and never change, so publishing needs no
/// lock. Events are best-effort: with no subscribers they are dropped.
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<SoulEvent>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = [Topic::Points, Topic::Penalty, Topic::Recovery]
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();
        Self { channels }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: SoulEvent) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SoulEvent> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Unreachable: every topic is created in `with_capacity`.
            None => broadcast::channel(1).1,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
