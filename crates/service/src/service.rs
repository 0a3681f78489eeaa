use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use shutter_blob::{BlobError, BlobStore, BlobStream};
use shutter_core::{Asset, AssetPage, IdAllocator};
use shutter_index::{IndexError, MetadataIndex};

use crate::config::ServiceConfig;
use crate::error::AssetError;
use crate::locks::IdLocks;
use crate::metrics::ServiceMetrics;

/// A stored asset opened for reading.
pub struct AssetContent {
    /// The asset's metadata record.
    pub asset: Asset,
    /// The asset's bytes.
    pub stream: BlobStream,
}

/// Owns the asset lifecycle across the blob store and metadata index.
///
/// Create writes the blob first and the record second, removing the blob if
/// the record cannot be written. Delete removes the record first and the blob
/// second, so a partial failure leaves orphaned bytes rather than a record
/// pointing at nothing. Both hold a per-id lock for their duration.
pub struct AssetService {
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) index: Arc<dyn MetadataIndex>,
    pub(crate) ids: Arc<dyn IdAllocator>,
    pub(crate) config: ServiceConfig,
    pub(crate) locks: IdLocks,
    pub(crate) metrics: Arc<ServiceMetrics>,
}

fn blob_unavailable(e: &BlobError) -> AssetError {
    AssetError::StorageUnavailable(e.to_string())
}

fn index_unavailable(e: &IndexError) -> AssetError {
    AssetError::StorageUnavailable(e.to_string())
}

impl AssetService {
    /// The limits this service enforces.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Outcome counters.
    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.metrics
    }

    /// Check an upload against the size and content type limits.
    pub fn check_upload(&self, mime: &str, size: u64) -> Result<(), AssetError> {
        if size > self.config.max_upload_bytes {
            self.metrics.increment_rejected();
            return Err(AssetError::TooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }
        if !self.config.mime_allowed(mime) {
            self.metrics.increment_rejected();
            return Err(AssetError::UnsupportedMediaType(mime.to_owned()));
        }
        Ok(())
    }

    /// Store a new asset and return its record.
    pub async fn create(
        &self,
        filename: &str,
        mime: &str,
        data: Bytes,
    ) -> Result<Asset, AssetError> {
        let size = data.len() as u64;
        self.check_upload(mime, size)?;

        let id = self.ids.allocate();
        let _guard = self.locks.lock(&id).await;
        let asset = Asset::new(id.clone(), filename, mime, size);

        match self.blobs.put(&id, data).await {
            Ok(()) => {}
            Err(BlobError::AlreadyExists(_)) => {
                self.metrics.increment_inconsistencies();
                error!(id = %id, "allocated id already has a blob");
                return Err(AssetError::Inconsistency {
                    id,
                    reason: "allocated id already has a blob".into(),
                });
            }
            Err(e) => return Err(blob_unavailable(&e)),
        }

        if let Err(e) = self.index.insert(&asset).await {
            self.metrics.increment_inconsistencies();
            match self.blobs.delete(&id).await {
                Ok(()) => {
                    self.metrics.increment_rollbacks();
                    warn!(id = %id, error = %e, "metadata insert failed, blob rolled back");
                }
                Err(rollback) => {
                    error!(
                        id = %id,
                        error = %e,
                        rollback_error = %rollback,
                        "metadata insert failed and blob rollback failed, orphaned blob needs removal"
                    );
                }
            }
            return Err(AssetError::Inconsistency {
                id,
                reason: format!("metadata insert failed: {e}"),
            });
        }

        self.metrics.increment_created();
        info!(
            id = %asset.id,
            filename = %asset.filename,
            mime = %asset.mime,
            size = asset.size,
            "asset created"
        );
        Ok(asset)
    }

    /// Look up an asset's record without opening its bytes.
    pub async fn head(&self, id: &str) -> Result<Asset, AssetError> {
        match self.index.get(id).await {
            Ok(asset) => Ok(asset),
            Err(IndexError::NotFound(_)) => {
                self.metrics.increment_not_found();
                Err(AssetError::NotFound(id.to_owned()))
            }
            Err(e) => Err(index_unavailable(&e)),
        }
    }

    /// Open an asset for reading.
    ///
    /// A blob that disappears between the record lookup and the open is
    /// reported as not found: either a concurrent delete won the race, or the
    /// record is dangling, which is logged.
    pub async fn get(&self, id: &str) -> Result<AssetContent, AssetError> {
        let asset = self.head(id).await?;

        match self.blobs.open(id).await {
            Ok(stream) => Ok(AssetContent { asset, stream }),
            Err(BlobError::NotFound(_)) => {
                self.metrics.increment_not_found();
                match self.index.get(id).await {
                    Err(IndexError::NotFound(_)) => {
                        debug!(id, "asset deleted while being read");
                    }
                    _ => {
                        self.metrics.increment_inconsistencies();
                        error!(id, "metadata record has no blob");
                    }
                }
                Err(AssetError::NotFound(id.to_owned()))
            }
            Err(e) => Err(blob_unavailable(&e)),
        }
    }

    /// List assets newest first.
    ///
    /// `limit` defaults to the configured page size and is clamped to the
    /// configured maximum; `offset` defaults to zero.
    pub async fn list(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<AssetPage, AssetError> {
        let limit = self.config.page_size(limit);
        let offset = offset.unwrap_or(0);
        self.index
            .list(limit, offset)
            .await
            .map_err(|e| index_unavailable(&e))
    }

    /// Delete an asset, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Asset, AssetError> {
        let _guard = self.locks.lock(id).await;

        let asset = match self.index.delete(id).await {
            Ok(asset) => asset,
            Err(IndexError::NotFound(_)) => {
                self.metrics.increment_not_found();
                return Err(AssetError::NotFound(id.to_owned()));
            }
            Err(e) => return Err(index_unavailable(&e)),
        };

        match self.blobs.delete(id).await {
            Ok(()) => {}
            Err(BlobError::NotFound(_)) => {
                warn!(id, "blob already absent while deleting asset");
            }
            Err(e) => {
                self.metrics.increment_inconsistencies();
                error!(id, error = %e, "metadata removed but blob removal failed, orphaned blob needs removal");
                return Err(AssetError::Inconsistency {
                    id: id.to_owned(),
                    reason: format!("blob removal failed: {e}"),
                });
            }
        }

        self.metrics.increment_deleted();
        info!(id, "asset deleted");
        Ok(asset)
    }

    /// Number of stored assets. Fails if the index is unreachable.
    pub async fn count(&self) -> Result<u64, AssetError> {
        self.index.count().await.map_err(|e| index_unavailable(&e))
    }
}
