use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::storage::traits::KeyValueStorage;

/// Storage backed by a directory, one `<key>.json` file per slot.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never observes a half-written slot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("Opened file storage at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Backend(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().expect("temp dir");

        let storage = FileStorage::open(dir.path().join("data")).expect("open");
        assert_eq!(storage.get("maadugal_listings").expect("get"), None);
        storage.set("maadugal_listings", "[]").expect("set");

        let reopened = FileStorage::open(dir.path().join("data")).expect("reopen");
        assert_eq!(
            reopened.get("maadugal_listings").expect("get"),
            Some("[]".to_string())
        );

        reopened.remove("maadugal_listings").expect("remove");
        reopened.remove("maadugal_listings").expect("remove missing");
        assert_eq!(storage.get("maadugal_listings").expect("get"), None);
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileStorage::open(dir.path()).expect("open");

        assert!(storage.set("../outside", "x").is_err());
        assert!(storage.get("").is_err());
        assert!(storage.get(".hidden").is_err());
    }
}
