//! ChannelBroadcaster - tokio broadcast channel によるドメインイベント配信

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::DomainEvent;
use crate::ports::EventBroadcaster;

/// Broadcasts every event to all current subscribers.
///
/// Lagging subscribers lose the oldest events; having no subscribers at all
/// is normal and only logged at debug.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<DomainEvent>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBroadcaster for ChannelBroadcaster {
    fn emit(&self, event: DomainEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            debug!(event = name, "no subscribers for event");
        }
    }
}
