use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// A blob is already stored under this identifier.
    ///
    /// Identifiers are allocator-fresh, so this signals a broken invariant
    /// rather than a normal conflict.
    #[error("blob already exists: {0}")]
    AlreadyExists(String),

    /// The identifier cannot be used as a storage key.
    #[error("invalid blob id: {0:?}")]
    InvalidId(String),

    /// An I/O error from the underlying medium.
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),
}

impl BlobError {
    /// Whether this error reports a missing blob.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
