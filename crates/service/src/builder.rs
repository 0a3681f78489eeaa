use std::sync::Arc;

use shutter_blob::BlobStore;
use shutter_core::{IdAllocator, UuidAllocator};
use shutter_index::MetadataIndex;

use crate::config::ServiceConfig;
use crate::error::AssetError;
use crate::locks::IdLocks;
use crate::metrics::ServiceMetrics;
use crate::service::AssetService;

/// Fluent builder for constructing an [`AssetService`].
///
/// A [`BlobStore`] and a [`MetadataIndex`] must be supplied. The identifier
/// allocator defaults to [`UuidAllocator`] and limits to
/// [`ServiceConfig::default`].
pub struct AssetServiceBuilder {
    blobs: Option<Arc<dyn BlobStore>>,
    index: Option<Arc<dyn MetadataIndex>>,
    ids: Arc<dyn IdAllocator>,
    config: ServiceConfig,
}

impl AssetServiceBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    pub fn new() -> Self {
        Self {
            blobs: None,
            index: None,
            ids: Arc::new(UuidAllocator),
            config: ServiceConfig::default(),
        }
    }

    /// Set the blob store implementation.
    #[must_use]
    pub fn blobs(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(store);
        self
    }

    /// Set the metadata index implementation.
    #[must_use]
    pub fn index(mut self, index: Arc<dyn MetadataIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Replace the identifier allocator.
    #[must_use]
    pub fn id_allocator(mut self, ids: Arc<dyn IdAllocator>) -> Self {
        self.ids = ids;
        self
    }

    /// Set upload limits and listing defaults.
    #[must_use]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the builder and produce a configured [`AssetService`].
    ///
    /// Returns [`AssetError::Configuration`] if the blob store or metadata
    /// index has not been set.
    pub fn build(self) -> Result<AssetService, AssetError> {
        let blobs = self
            .blobs
            .ok_or_else(|| AssetError::Configuration("blob store is required".into()))?;

        let index = self
            .index
            .ok_or_else(|| AssetError::Configuration("metadata index is required".into()))?;

        if self.config.default_page_size > self.config.max_page_size {
            return Err(AssetError::Configuration(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.config.default_page_size, self.config.max_page_size
            )));
        }

        Ok(AssetService {
            blobs,
            index,
            ids: self.ids,
            config: self.config,
            locks: IdLocks::new(),
            metrics: Arc::new(ServiceMetrics::default()),
        })
    }
}

impl Default for AssetServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shutter_blob_memory::MemoryBlobStore;
    use shutter_index_memory::MemoryMetadataIndex;

    #[test]
    fn build_missing_blobs_returns_error() {
        let index = Arc::new(MemoryMetadataIndex::new());
        let result = AssetServiceBuilder::new().index(index).build();
        let err = result.err().unwrap();
        assert!(err.to_string().contains("blob store is required"));
    }

    #[test]
    fn build_missing_index_returns_error() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let result = AssetServiceBuilder::new().blobs(blobs).build();
        let err = result.err().unwrap();
        assert!(err.to_string().contains("metadata index is required"));
    }

    #[test]
    fn build_rejects_default_page_above_max() {
        let result = AssetServiceBuilder::new()
            .blobs(Arc::new(MemoryBlobStore::new()))
            .index(Arc::new(MemoryMetadataIndex::new()))
            .config(ServiceConfig {
                default_page_size: 50,
                max_page_size: 10,
                ..ServiceConfig::default()
            })
            .build();
        assert!(matches!(result, Err(AssetError::Configuration(_))));
    }

    #[test]
    fn build_with_required_fields_succeeds() {
        let result = AssetServiceBuilder::new()
            .blobs(Arc::new(MemoryBlobStore::new()))
            .index(Arc::new(MemoryMetadataIndex::new()))
            .build();
        assert!(result.is_ok());
    }
}
