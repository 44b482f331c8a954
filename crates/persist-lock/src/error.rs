//! Error types for lock coordination.

use persist_blob::BlobError;
use thiserror::Error;

/// Errors that can occur while resolving a lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// Probing the lock blob's existence failed.
    #[error("error checking lock {path}: {source}")]
    CheckFailed {
        path: String,
        #[source]
        source: BlobError,
    },

    /// Reading the lock blob's content failed.
    #[error("error reading lock {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BlobError,
    },

    /// The lock blob does not hold a two-part token.
    #[error("lock {path} is corrupted: {content:?}")]
    Corrupted { path: String, content: String },

    /// The lock was still held after every scheduled check.
    #[error("lock {path} is held by {holder} after {attempts} checks")]
    Locked {
        path: String,
        holder: String,
        attempts: u32,
    },

    /// Writing or deleting the lock blob failed.
    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// Convenience type alias for lock operations.
pub type LockResult<T> = std::result::Result<T, LockError>;
