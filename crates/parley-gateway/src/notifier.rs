use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_types::events::{ChatChange, GatewayEvent};

use crate::dispatcher::Dispatcher;

/// Relays chat-table changes from the store to every websocket client,
/// unfiltered. Stops when `shutdown` is cancelled or the feed closes.
pub struct Notifier;

impl Notifier {
    pub fn spawn(
        mut changes: broadcast::Receiver<ChatChange>,
        dispatcher: Dispatcher,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Realtime notifier started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    result = changes.recv() => match result {
                        Ok(change) => {
                            debug!(
                                "Chat {} {:?}, relaying to {} clients",
                                change.record.id,
                                change.kind,
                                dispatcher.connected_clients()
                            );
                            dispatcher.broadcast(GatewayEvent::from(change));
                        }
                        Err(RecvError::Lagged(n)) => {
                            warn!("Change feed lagged by {} events", n);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            info!("Realtime notifier stopped");
        })
    }
}
