//! Local-first listing store for the maadugal cattle marketplace.
//!
//! Listings live in a durable key-value slot, are kept in sync across open
//! contexts on a best-effort basis, and every transaction is handed off to a
//! WhatsApp deep-link.

pub mod clock;
pub mod config;
pub mod contact;
pub mod error;
pub mod expiry;
pub mod filter;
pub mod media;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use contact::{ContactLauncher, LoggingLauncher, RecordingLauncher, SystemLauncher};
pub use error::{StorageError, StoreError};
pub use filter::{filtered_view, FilterCriteria, SortOrder};
pub use models::{Language, Listing, ListingDraft, ListingStatus, MediaFile, TN_DISTRICTS};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{ListingStore, StorePorts};
pub use sync::{BroadcastHub, NoopSync, SyncChannel};
