use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::error::BlobError;

/// A stream of blob content chunks.
pub type BlobStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Write-once storage for raw asset bytes, keyed by asset id.
///
/// Implementations must never expose a partially written blob: `get` and
/// `open` either see the complete content or report [`BlobError::NotFound`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `id`.
    ///
    /// Fails with [`BlobError::AlreadyExists`] if `id` is taken; an existing
    /// blob is never overwritten.
    async fn put(&self, id: &str, data: Bytes) -> Result<(), BlobError>;

    /// Read the full content of a blob.
    async fn get(&self, id: &str) -> Result<Bytes, BlobError>;

    /// Open a blob for streaming.
    ///
    /// The default implementation reads the whole blob with [`get`](Self::get)
    /// and yields it as a single chunk.
    async fn open(&self, id: &str) -> Result<BlobStream, BlobError> {
        let data = self.get(id).await?;
        Ok(futures::stream::once(async move { Ok(data) }).boxed())
    }

    /// Remove a blob. Fails with [`BlobError::NotFound`] if it was absent.
    async fn delete(&self, id: &str) -> Result<(), BlobError>;

    /// Whether a blob is stored under `id`.
    async fn exists(&self, id: &str) -> Result<bool, BlobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_dyn_blob_store(_: &dyn BlobStore) {}
}
