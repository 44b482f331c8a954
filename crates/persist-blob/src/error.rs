/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The requested blob does not exist.
    #[error("blob not found: {path}")]
    NotFound { path: String },

    /// Transport or backend failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound { .. })
    }

    /// Map a backend I/O error, turning `ErrorKind::NotFound` into [`BlobError::NotFound`].
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            BlobError::NotFound {
                path: path.to_string(),
            }
        } else {
            BlobError::Io {
                path: path.to_string(),
                source,
            }
        }
    }
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
