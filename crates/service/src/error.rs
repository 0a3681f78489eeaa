use thiserror::Error;

/// Errors surfaced by [`AssetService`](crate::AssetService) operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The request was malformed (e.g. no file part in an upload).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No live asset has this id.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The upload exceeds the configured size limit.
    #[error("asset too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// The upload's content type is not accepted.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Metadata and bytes for an asset could not be kept in step.
    ///
    /// One compensating action has already been attempted; the operation
    /// must not be retried blindly.
    #[error("internal inconsistency for asset {id}: {reason}")]
    Inconsistency {
        /// The affected asset id.
        id: String,
        /// What went wrong.
        reason: String,
    },

    /// Durable storage could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The service was assembled without a required component.
    #[error("configuration error: {0}")]
    Configuration(String),
}
