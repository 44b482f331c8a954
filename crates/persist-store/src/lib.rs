//! Keyed JSON documents in a blob bucket, guarded by advisory locks.
//!
//! Each key owns two blobs under the configured folder:
//!
//! ```text
//! <folder>/<key>.lock    "<owner>:<acquired_at_ms>"
//! <folder>/<key>.json    the document
//! ```
//!
//! [`KeyedObjectStore::fetch`] claims the lock before reading and leaves it
//! in place; [`KeyedObjectStore::persist`] only waits on a foreign lock and
//! never touches it. Locks lapse after `max_lock_time` or are reclaimed by
//! their owner's next fetch.
//!
//! # Modules
//!
//! - [`config`] — [`StoreConfig`], loadable from TOML
//! - [`store`] — [`KeyedObjectStore`] and [`LockMode`]
//! - [`error`] — [`StoreError`]

pub mod config;
pub mod error;
pub mod store;

pub use config::{StoreConfig, DEFAULT_FOLDER_NAME};
pub use error::{StoreError, StoreResult};
pub use store::{KeyedObjectStore, LockMode};

// Re-export the pieces callers need to build a store.
pub use persist_blob::{BlobStore, FsBlobStore, InMemoryBlobStore};
pub use persist_lock::{ExponentialBackoff, FixedBackoff, RetryPolicy};
pub use persist_types::{Clock, OwnerId, SystemClock};
