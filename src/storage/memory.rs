use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::StorageError;
use crate::storage::traits::KeyValueStorage;

/// In-memory storage. Clones share the same slots, so several stores built
/// from clones behave like contexts of one origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::Backend("memory storage lock poisoned".to_string())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.read().map_err(|_| Self::poisoned())?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_slots() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set("k", "v1").expect("set");
        assert_eq!(other.get("k").expect("get"), Some("v1".to_string()));

        other.set("k", "v2").expect("overwrite");
        assert_eq!(storage.get("k").expect("get"), Some("v2".to_string()));

        storage.remove("k").expect("remove");
        storage.remove("k").expect("remove twice");
        assert_eq!(other.get("k").expect("get"), None);
    }
}
