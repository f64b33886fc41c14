use thiserror::Error;

use crate::models::ValidationErrors;

/// Failure reported by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Errors surfaced by listing store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("listing is invalid: {0}")]
    Validation(ValidationErrors),

    #[error("listing not found: {0}")]
    NotFound(String),

    #[error("failed to read media file {name}")]
    Media {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Validation(errors)
    }
}
