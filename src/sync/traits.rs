use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use uuid::Uuid;

use crate::models::Listing;
use crate::sync::message::{decode_envelope, Inbound};

/// Best-effort fan-out of the listing collection to other open contexts.
///
/// No delivery or ordering guarantee. A channel that reports
/// `is_supported() == false` must accept broadcasts and do nothing.
pub trait SyncChannel: Send + Sync {
    /// Whether this environment can reach other contexts at all
    fn is_supported(&self) -> bool;

    /// Send the full collection to every other context. Never fails.
    fn broadcast(&self, listings: &[Listing]);

    /// Start receiving collections sent by other contexts.
    /// Returns None when the channel is unsupported.
    fn subscribe(&self) -> Option<SyncSubscription>;
}

/// Channel for environments without cross-context messaging
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSync;

impl SyncChannel for NoopSync {
    fn is_supported(&self) -> bool {
        false
    }

    fn broadcast(&self, _listings: &[Listing]) {}

    fn subscribe(&self) -> Option<SyncSubscription> {
        None
    }
}

/// Inbound side of a sync channel for one context
pub struct SyncSubscription {
    origin: Uuid,
    receiver: broadcast::Receiver<String>,
}

impl SyncSubscription {
    pub(crate) fn new(origin: Uuid, receiver: broadcast::Receiver<String>) -> Self {
        Self { origin, receiver }
    }

    /// Wait for the next collection sent by another context.
    ///
    /// Returns None once every sender is gone. Missed messages after a lag are
    /// skipped since each message carries the whole collection.
    pub async fn recv(&mut self) -> Option<Vec<Listing>> {
        loop {
            match self.receiver.recv().await {
                Ok(raw) => match decode_envelope(&raw, self.origin) {
                    Inbound::Adopt(listings) => return Some(listings),
                    Inbound::Ignore => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Sync receiver lagged, skipped {} messages", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
