//! In-memory [`BlobStore`] backend.
//!
//! Blobs live in a sharded concurrent map and vanish with the process. Useful
//! for tests and throwaway deployments.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use shutter_blob::{BlobError, BlobStore};

/// Blob store backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, id: &str, data: Bytes) -> Result<(), BlobError> {
        match self.blobs.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(BlobError::AlreadyExists(id.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(data);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Bytes, BlobError> {
        self.blobs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BlobError::NotFound(id.to_owned()))
    }

    async fn delete(&self, id: &str) -> Result<(), BlobError> {
        self.blobs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(id.to_owned()))
    }

    async fn exists(&self, id: &str) -> Result<bool, BlobError> {
        Ok(self.blobs.contains_key(id))
    }
}
