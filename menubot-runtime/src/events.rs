//! Status/event stream pushed to the host (operator UI, CLI).

use crate::lifecycle::BotStatus;
use tokio::sync::broadcast;
use tracing::info;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    StatusChanged(BotStatus),
    /// Human-readable status line.
    Log(String),
    /// Opaque pairing payload, rendered by the host.
    PairingChallenge(String),
    Authenticated,
    Disconnected(String),
}

/// Broadcast sender; events with no subscriber are dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StatusEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: StatusEvent) {
        let _ = self.tx.send(event);
    }

    pub fn status(&self, status: BotStatus) {
        self.emit(StatusEvent::StatusChanged(status));
    }

    /// Logs the line and forwards it to the host.
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        info!(status_line = %line, "operator log");
        self.emit(StatusEvent::Log(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.status(BotStatus::Starting);
        bus.log("Starting transport...");

        assert_eq!(rx.recv().await.unwrap(), StatusEvent::StatusChanged(BotStatus::Starting));
        assert_eq!(
            rx.recv().await.unwrap(),
            StatusEvent::Log("Starting transport...".to_string())
        );
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        EventBus::new().log("nobody listening");
    }
}
