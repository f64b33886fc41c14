pub mod broadcast;
pub mod message;
pub mod traits;

pub use broadcast::{BroadcastHub, BroadcastSync};
pub use message::{decode_envelope, encode_envelope, Inbound, SyncEnvelope, SYNC_KIND};
pub use traits::{NoopSync, SyncChannel, SyncSubscription};
