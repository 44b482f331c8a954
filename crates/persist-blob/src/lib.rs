//! Blob storage for gcr-persist.
//!
//! A bucket holds named byte blobs addressed by `/`-separated paths. The
//! store offers no compare-and-swap and no leases: just `exists`, `read_all`,
//! `write_all` and `delete` on individual blobs. Everything the lock protocol
//! does is built from those four calls.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based bucket with an operation journal
//!   and fault injection, for tests and embedding
//! - [`FsBlobStore`] -- a directory per bucket, one file per blob
//!
//! # Design Rules
//!
//! 1. Blobs are independent; there is no atomic update across two paths.
//! 2. A single blob has read-after-write consistency.
//! 3. Transport failures surface as [`BlobError::Io`] and are never retried here.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::{BlobOp, BlobOpKind, InMemoryBlobStore};
pub use traits::{BlobStore, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
