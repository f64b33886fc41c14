use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::Listing;
use crate::storage::codec::decode_collection;

/// Message type carrying a full listing collection
pub const SYNC_KIND: &str = "sync";

/// Wire form of a sync message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    /// Context that sent the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Uuid>,
    #[serde(default)]
    pub payload: Value,
}

/// What a receiver should do with an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Not addressed to listing sync, or sent by this context
    Ignore,
    /// Adopt this collection (after pruning)
    Adopt(Vec<Listing>),
}

pub fn encode_envelope(origin: Uuid, listings: &[Listing]) -> Result<String, serde_json::Error> {
    let envelope = SyncEnvelope {
        kind: SYNC_KIND.to_string(),
        origin: Some(origin),
        payload: serde_json::to_value(listings)?,
    };
    serde_json::to_string(&envelope)
}

/// Interpret raw message text received by the context `own_origin`.
///
/// A `sync` message with a missing or malformed payload adopts an empty
/// collection.
pub fn decode_envelope(raw: &str, own_origin: Uuid) -> Inbound {
    let Ok(envelope) = serde_json::from_str::<SyncEnvelope>(raw) else {
        return Inbound::Ignore;
    };
    if envelope.kind != SYNC_KIND || envelope.origin == Some(own_origin) {
        return Inbound::Ignore;
    }
    Inbound::Adopt(decode_collection(envelope.payload))
}
