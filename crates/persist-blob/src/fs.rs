//! Directory-backed bucket.
//!
//! Layout under `root`:
//!
//! ```text
//! <root>/<bucket>/<path>                 blob content
//! <root>/<bucket>/<path>.content-type    content type sidecar
//! ```
//!
//! The bucket directory is never created by the store; `bucket_exists`
//! reports whether it is there.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

const CONTENT_TYPE_SUFFIX: &str = ".content-type";

/// A bucket stored as a directory of files.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    bucket: String,
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl AsRef<Path>, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let dir = root.as_ref().join(&bucket);
        Self { bucket, dir }
    }

    /// Directory holding this bucket's blobs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the bucket directory.
    pub async fn create_bucket(&self) -> BlobResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BlobError::from_io(&self.bucket, e))
    }

    /// Content type recorded when the blob was last written.
    pub async fn content_type(&self, path: &str) -> BlobResult<String> {
        let sidecar = sidecar_path(&self.file_path(path)?);
        tokio::fs::read_to_string(&sidecar)
            .await
            .map_err(|e| BlobError::from_io(path, e))
    }

    fn file_path(&self, path: &str) -> BlobResult<PathBuf> {
        let escapes = path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
        if escapes {
            return Err(BlobError::Io {
                path: path.to_string(),
                source: std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "blob path must be relative with no empty, '.' or '..' components",
                ),
            });
        }
        Ok(self.dir.join(path))
    }
}

fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(CONTENT_TYPE_SUFFIX);
    PathBuf::from(name)
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> BlobResult<bool> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::from_io(&self.bucket, e)),
        }
    }

    async fn exists(&self, path: &str) -> BlobResult<bool> {
        let file = self.file_path(path)?;
        tokio::fs::try_exists(&file)
            .await
            .map_err(|e| BlobError::from_io(path, e))
    }

    async fn read_all(&self, path: &str) -> BlobResult<Vec<u8>> {
        let file = self.file_path(path)?;
        tokio::fs::read(&file)
            .await
            .map_err(|e| BlobError::from_io(path, e))
    }

    async fn write_all(&self, path: &str, data: &[u8], content_type: &str) -> BlobResult<()> {
        let file = self.file_path(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::from_io(path, e))?;
        }
        tokio::fs::write(&file, data)
            .await
            .map_err(|e| BlobError::from_io(path, e))?;
        tokio::fs::write(sidecar_path(&file), content_type)
            .await
            .map_err(|e| BlobError::from_io(path, e))?;
        debug!(bucket = %self.bucket, path, len = data.len(), "blob written");
        Ok(())
    }

    async fn delete(&self, path: &str) -> BlobResult<()> {
        let file = self.file_path(path)?;
        tokio::fs::remove_file(&file)
            .await
            .map_err(|e| BlobError::from_io(path, e))?;
        match tokio::fs::remove_file(sidecar_path(&file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::from_io(path, e)),
        }
    }
}
