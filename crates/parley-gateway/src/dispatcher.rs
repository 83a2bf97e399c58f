use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;

use parley_types::events::GatewayEvent;

/// Fan-out hub shared by the notifier and every websocket connection.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// All connected clients receive all events
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Number of open websocket connections
    connected: AtomicUsize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                connected: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    pub fn client_connected(&self) -> usize {
        self.inner.connected.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn client_disconnected(&self) -> usize {
        self.inner.connected.fetch_sub(1, Ordering::Relaxed) - 1
    }

    pub fn connected_clients(&self) -> usize {
        self.inner.connected.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_gets_every_event() {
        let dispatcher = Dispatcher::new();
        let mut a = dispatcher.subscribe();
        let mut b = dispatcher.subscribe();

        dispatcher.broadcast(GatewayEvent::Ready { connection_id: "x".into() });

        assert!(matches!(a.try_recv().unwrap(), GatewayEvent::Ready { .. }));
        assert!(matches!(b.try_recv().unwrap(), GatewayEvent::Ready { .. }));
    }

    #[test]
    fn connection_counting() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.client_connected(), 1);
        assert_eq!(dispatcher.clone().client_connected(), 2);
        assert_eq!(dispatcher.client_disconnected(), 1);
        assert_eq!(dispatcher.connected_clients(), 1);
    }
}
