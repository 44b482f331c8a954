use async_trait::async_trait;

use crate::error::BlobResult;

/// Content type for lock token blobs.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Content type for JSON data blobs.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A bucket of named byte blobs.
///
/// All implementations must satisfy these invariants:
/// - Each path is an independent blob; writes to one path never affect another.
/// - A write followed by a read of the same path observes the write.
/// - `write_all` replaces the previous content of the path entirely.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Name of the bucket this store addresses.
    fn bucket(&self) -> &str;

    /// Check whether the bucket itself exists.
    async fn bucket_exists(&self) -> BlobResult<bool>;

    /// Check whether a blob exists at `path`.
    async fn exists(&self, path: &str) -> BlobResult<bool>;

    /// Read the entire content of a blob.
    ///
    /// Returns `Err(BlobError::NotFound)` if the blob does not exist.
    async fn read_all(&self, path: &str) -> BlobResult<Vec<u8>>;

    /// Create or overwrite a blob.
    async fn write_all(&self, path: &str, data: &[u8], content_type: &str) -> BlobResult<()>;

    /// Delete a blob.
    ///
    /// Returns `Err(BlobError::NotFound)` if the blob does not exist.
    async fn delete(&self, path: &str) -> BlobResult<()>;
}
