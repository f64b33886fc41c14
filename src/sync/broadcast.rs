use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Listing;
use crate::sync::message::encode_envelope;
use crate::sync::traits::{SyncChannel, SyncSubscription};

const CHANNEL_CAPACITY: usize = 16;

/// A named in-process channel shared by every context of the application.
///
/// Each context takes its own [`BroadcastSync`] endpoint; messages are not
/// delivered back to the endpoint that sent them.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    name: String,
    sender: broadcast::Sender<String>,
}

impl BroadcastHub {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the endpoint for one more context
    pub fn endpoint(&self) -> BroadcastSync {
        BroadcastSync {
            origin: Uuid::new_v4(),
            name: self.name.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Deliver raw message text to every context, bypassing the envelope encoder
    pub fn post_raw(&self, raw: impl Into<String>) {
        if self.sender.send(raw.into()).is_err() {
            debug!("No listeners on sync channel {}", self.name);
        }
    }
}

/// One context's endpoint on a [`BroadcastHub`]
#[derive(Debug, Clone)]
pub struct BroadcastSync {
    origin: Uuid,
    name: String,
    sender: broadcast::Sender<String>,
}

impl BroadcastSync {
    pub fn origin(&self) -> Uuid {
        self.origin
    }
}

impl SyncChannel for BroadcastSync {
    fn is_supported(&self) -> bool {
        true
    }

    fn broadcast(&self, listings: &[Listing]) {
        let raw = match encode_envelope(self.origin, listings) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode sync message on {}: {}", self.name, e);
                return;
            }
        };
        // Only fails when no context is listening.
        if self.sender.send(raw).is_err() {
            debug!("No listeners on sync channel {}", self.name);
        }
    }

    fn subscribe(&self) -> Option<SyncSubscription> {
        Some(SyncSubscription::new(self.origin, self.sender.subscribe()))
    }
}
