use thiserror::Error;

/// Errors that can occur during metadata index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No record exists for the identifier.
    #[error("asset record not found: {0}")]
    NotFound(String),

    /// A record with this identifier already exists.
    #[error("asset record already exists: {0}")]
    Conflict(String),

    /// The backing store could not be reached.
    #[error("index unavailable: {0}")]
    Unavailable(String),

    /// The backend failed while executing an operation.
    #[error("index backend error: {0}")]
    Backend(String),
}

impl IndexError {
    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
