use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// The kind of a journaled blob operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobOpKind {
    Exists,
    Read,
    Write,
    Delete,
}

/// One operation recorded by [`InMemoryBlobStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobOp {
    pub kind: BlobOpKind,
    pub path: String,
}

#[derive(Clone, Debug)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

/// In-memory, HashMap-based bucket.
///
/// Intended for tests and embedding. Every blob operation is appended to a
/// journal so callers can assert exactly which paths were touched, and
/// one-shot faults can be armed per operation and path.
pub struct InMemoryBlobStore {
    bucket: String,
    bucket_present: RwLock<bool>,
    blobs: RwLock<HashMap<String, StoredBlob>>,
    journal: RwLock<Vec<BlobOp>>,
    faults: RwLock<Vec<BlobOp>>,
}

impl InMemoryBlobStore {
    /// Create an empty, existing bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_present: RwLock::new(true),
            blobs: RwLock::new(HashMap::new()),
            journal: RwLock::new(Vec::new()),
            faults: RwLock::new(Vec::new()),
        }
    }

    /// Make `bucket_exists` report `false`.
    pub fn remove_bucket(&self) {
        *self.bucket_present.write().expect("lock poisoned") = false;
    }

    /// Store a blob directly, bypassing the journal.
    pub fn put(&self, path: &str, data: impl Into<Vec<u8>>, content_type: &str) {
        self.blobs.write().expect("lock poisoned").insert(
            path.to_string(),
            StoredBlob {
                data: data.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    /// Read a blob directly, bypassing the journal.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(path)
            .map(|b| b.data.clone())
    }

    /// Read a blob as UTF-8 text, bypassing the journal.
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Content type recorded for a blob.
    pub fn content_type(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(path)
            .map(|b| b.content_type.clone())
    }

    /// Remove a blob directly, bypassing the journal.
    pub fn remove(&self, path: &str) -> bool {
        self.blobs
            .write()
            .expect("lock poisoned")
            .remove(path)
            .is_some()
    }

    /// Whether a blob is present, bypassing the journal.
    pub fn contains(&self, path: &str) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(path)
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the bucket holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Arm a one-shot I/O failure for the next `kind` operation on `path`.
    pub fn fail_next(&self, kind: BlobOpKind, path: &str) {
        self.faults.write().expect("lock poisoned").push(BlobOp {
            kind,
            path: path.to_string(),
        });
    }

    /// All journaled operations, oldest first.
    pub fn ops(&self) -> Vec<BlobOp> {
        self.journal.read().expect("lock poisoned").clone()
    }

    /// Journaled operations touching `path`.
    pub fn ops_for(&self, path: &str) -> Vec<BlobOp> {
        self.journal
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|op| op.path == path)
            .cloned()
            .collect()
    }

    /// Count of journaled `kind` operations on `path`.
    pub fn count(&self, kind: BlobOpKind, path: &str) -> usize {
        self.journal
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|op| op.kind == kind && op.path == path)
            .count()
    }

    /// Forget all journaled operations.
    pub fn clear_ops(&self) {
        self.journal.write().expect("lock poisoned").clear();
    }

    /// Journal the operation, then fire an armed fault if one matches.
    fn record(&self, kind: BlobOpKind, path: &str) -> BlobResult<()> {
        self.journal.write().expect("lock poisoned").push(BlobOp {
            kind,
            path: path.to_string(),
        });

        let mut faults = self.faults.write().expect("lock poisoned");
        if let Some(pos) = faults.iter().position(|f| f.kind == kind && f.path == path) {
            faults.remove(pos);
            return Err(BlobError::Io {
                path: path.to_string(),
                source: std::io::Error::other(format!("injected {kind:?} fault")),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> BlobResult<bool> {
        Ok(*self.bucket_present.read().expect("lock poisoned"))
    }

    async fn exists(&self, path: &str) -> BlobResult<bool> {
        self.record(BlobOpKind::Exists, path)?;
        Ok(self.contains(path))
    }

    async fn read_all(&self, path: &str) -> BlobResult<Vec<u8>> {
        self.record(BlobOpKind::Read, path)?;
        self.get(path).ok_or_else(|| BlobError::NotFound {
            path: path.to_string(),
        })
    }

    async fn write_all(&self, path: &str, data: &[u8], content_type: &str) -> BlobResult<()> {
        self.record(BlobOpKind::Write, path)?;
        self.put(path, data, content_type);
        Ok(())
    }

    async fn delete(&self, path: &str) -> BlobResult<()> {
        self.record(BlobOpKind::Delete, path)?;
        if self.remove(path) {
            Ok(())
        } else {
            Err(BlobError::NotFound {
                path: path.to_string(),
            })
        }
    }
}

impl fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("bucket", &self.bucket)
            .field("blob_count", &self.len())
            .finish()
    }
}
