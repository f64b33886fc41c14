use crate::error::StorageError;

/// Durable string slots keyed by name, like a browser's local storage.
///
/// Implementations must be safe to share between the store and its background tasks.
pub trait KeyValueStorage: Send + Sync {
    /// Get the value stored under `key`. Returns None if the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Clear the slot under `key`. Clearing an empty slot is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
