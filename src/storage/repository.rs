use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::models::{Language, Listing};
use crate::storage::codec::parse_collection;
use crate::storage::traits::KeyValueStorage;
use crate::sync::SyncChannel;

/// Reads and writes the listing collection and the language preference.
///
/// Every successful save is also broadcast to the other open contexts.
pub struct ListingRepository {
    storage: Arc<dyn KeyValueStorage>,
    sync: Arc<dyn SyncChannel>,
    listings_key: String,
    language_key: String,
}

impl ListingRepository {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        sync: Arc<dyn SyncChannel>,
        config: &StoreConfig,
    ) -> Self {
        Self {
            storage,
            sync,
            listings_key: config.listings_key.clone(),
            language_key: config.language_key.clone(),
        }
    }

    pub fn sync(&self) -> &Arc<dyn SyncChannel> {
        &self.sync
    }

    /// Load the stored collection. Missing or corrupt data loads as empty;
    /// only a failing backend is an error.
    pub fn try_load(&self) -> Result<Vec<Listing>, StorageError> {
        Ok(match self.storage.get(&self.listings_key)? {
            Some(raw) => parse_collection(&raw),
            None => Vec::new(),
        })
    }

    /// Like [`try_load`](Self::try_load), but a backend failure also loads as empty.
    pub fn load(&self) -> Vec<Listing> {
        self.try_load().unwrap_or_else(|e| {
            warn!("Failed to read listings, using an empty collection: {}", e);
            Vec::new()
        })
    }

    /// Overwrite the stored collection and broadcast it.
    pub fn save(&self, listings: &[Listing]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(listings)?;
        self.storage.set(&self.listings_key, &raw)?;
        debug!("Saved {} listings ({} bytes)", listings.len(), raw.len());
        self.sync.broadcast(listings);
        Ok(())
    }

    pub fn load_language(&self) -> Language {
        match self.storage.get(&self.language_key) {
            Ok(Some(code)) => Language::from_code(&code),
            Ok(None) => Language::default(),
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                Language::default()
            }
        }
    }

    pub fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.storage.set(&self.language_key, language.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::sync::{BroadcastHub, NoopSync};
    use chrono::{DateTime, Duration};

    fn listing(id: &str) -> Listing {
        let created_at = DateTime::from_timestamp_millis(1_700_000_000_123).expect("timestamp");
        Listing {
            id: id.to_string(),
            breed: "Jersey".to_string(),
            age: 3.0,
            milk_yield: 12.5,
            price: 45000.0,
            district: "Salem".to_string(),
            features: "calm".to_string(),
            images: vec!["data:image/png;base64,AAEC".to_string()],
            video: None,
            image_drive_links: vec!["https://drive.example/1".to_string()],
            video_drive_link: Some("https://drive.example/v".to_string()),
            created_at,
            expires_at: created_at + Duration::days(30),
            expired: false,
            booked: true,
        }
    }

    fn repository(storage: MemoryStorage) -> ListingRepository {
        ListingRepository::new(Arc::new(storage), Arc::new(NoopSync), &StoreConfig::default())
    }

    #[test]
    fn save_then_load_is_identity() {
        let repo = repository(MemoryStorage::new());
        let listings = vec![listing("a"), listing("b")];

        repo.save(&listings).expect("save");
        assert_eq!(repo.load(), listings);

        repo.save(&repo.load()).expect("save again");
        assert_eq!(repo.load(), listings);
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set("maadugal_listings", "not json").expect("seed");
        assert!(repository(storage).load().is_empty());
    }

    struct UnreadableStorage;

    impl KeyValueStorage for UnreadableStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("EIO".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn read_failure_is_distinct_from_corrupt_data() {
        let repo = ListingRepository::new(
            Arc::new(UnreadableStorage),
            Arc::new(NoopSync),
            &StoreConfig::default(),
        );
        assert!(matches!(repo.try_load(), Err(StorageError::Backend(_))));
        assert!(repo.load().is_empty());

        let storage = MemoryStorage::new();
        storage.set("maadugal_listings", "not json").expect("seed");
        assert!(repository(storage).try_load().expect("readable").is_empty());
    }

    #[test]
    fn missing_slot_loads_empty() {
        assert!(repository(MemoryStorage::new()).load().is_empty());
    }

    #[test]
    fn language_defaults_to_english_and_persists() {
        let storage = MemoryStorage::new();
        let repo = repository(storage.clone());
        assert_eq!(repo.load_language(), Language::En);

        repo.save_language(Language::Ta).expect("save language");
        assert_eq!(storage.get("lang").expect("get"), Some("ta".to_string()));
        assert_eq!(repo.load_language(), Language::Ta);
    }

    #[tokio::test]
    async fn save_broadcasts_to_other_contexts() {
        let hub = BroadcastHub::new("maadugal_listings");
        let mut other = hub.endpoint().subscribe().expect("supported");
        let repo = ListingRepository::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(hub.endpoint()),
            &StoreConfig::default(),
        );

        repo.save(&[listing("a")]).expect("save");
        let received = other.recv().await.expect("message");
        assert_eq!(received, vec![listing("a")]);
    }
}
