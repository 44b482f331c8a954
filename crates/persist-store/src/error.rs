use persist_blob::BlobError;
use persist_lock::LockError;
use persist_types::TypeError;
use thiserror::Error;

/// Errors surfaced by [`KeyedObjectStore`](crate::KeyedObjectStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured bucket does not exist.
    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    InvalidKey(#[from] TypeError),

    /// Lock resolution failed on contention, corruption, or a lock probe.
    #[error(transparent)]
    Lock(LockError),

    /// No document is stored under the key.
    #[error("no document stored for key '{key}'")]
    NotFound { key: String },

    #[error("error reading document '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("document '{key}' is not valid JSON: {source}")]
    DecodeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document '{key}' could not be encoded: {source}")]
    EncodeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transport failure, propagated as-is.
    #[error(transparent)]
    Io(#[from] BlobError),
}

/// Transport failures writing or deleting a lock blob surface as [`StoreError::Io`].
impl From<LockError> for StoreError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Blob(source) => StoreError::Io(source),
            other => StoreError::Lock(other),
        }
    }
}

impl StoreError {
    /// The key is held by another owner.
    pub fn is_locked(&self) -> bool {
        matches!(self, StoreError::Lock(LockError::Locked { .. }))
    }

    /// The key's lock blob is corrupted.
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StoreError::Lock(LockError::Corrupted { .. }))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
