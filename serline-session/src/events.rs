//! Engine notification fan-out

use bytes::Bytes;
use tokio::sync::mpsc;

/// One notification published by the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Connection established (`true`) or torn down (`false`).
    ConnectionChanged(bool),
    /// Human-readable fault description naming the affected port.
    Fault(String),
    /// Raw inbound chunk, published before any filter runs over it.
    BytesReceived(Bytes),
    /// The exact bytes a send attempt handed to the transport.
    BytesSent(Bytes),
    /// Bytes received within the throughput window that just closed.
    Throughput(u64),
}

/// Fan-out of engine events to registered subscribers.
///
/// Delivery is in subscription order. Subscriptions cannot be removed
/// mid-lifecycle; a subscriber that dropped its receiver is skipped.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return its receiving end.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Publish to every subscriber in registration order.
    pub fn publish(&self, event: &EngineEvent) {
        for subscriber in &self.subscribers {
            let _ = subscriber.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_every_event() {
        let mut bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(&EngineEvent::ConnectionChanged(true));
        bus.publish(&EngineEvent::Throughput(42));

        for rx in [&mut first, &mut second] {
            assert!(matches!(rx.try_recv(), Ok(EngineEvent::ConnectionChanged(true))));
            assert!(matches!(rx.try_recv(), Ok(EngineEvent::Throughput(42))));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn dropped_subscribers_do_not_block_publishing() {
        let mut bus = EventBus::new();
        let first = bus.subscribe();
        let mut second = bus.subscribe();
        drop(first);

        bus.publish(&EngineEvent::Fault("poof".to_string()));
        assert!(matches!(second.try_recv(), Ok(EngineEvent::Fault(_))));
    }
}
