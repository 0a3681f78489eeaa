use async_trait::async_trait;

use shutter_core::{Asset, AssetPage};

use crate::error::IndexError;

/// Durable mapping from asset id to its metadata record.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Add a new record. Fails with [`IndexError::Conflict`] if the id is taken.
    async fn insert(&self, asset: &Asset) -> Result<(), IndexError>;

    /// Look up a record by id.
    async fn get(&self, id: &str) -> Result<Asset, IndexError>;

    /// Remove a record, returning it. Fails with [`IndexError::NotFound`] if
    /// no record exists, so concurrent deletes of one id have one winner.
    async fn delete(&self, id: &str) -> Result<Asset, IndexError>;

    /// Return up to `limit` records, newest first, after skipping `offset`.
    ///
    /// Ordering is `created_at` descending with ties broken by id
    /// descending. `items` and `total` describe the same snapshot: a
    /// concurrent insert is either counted and visible, or neither.
    async fn list(&self, limit: usize, offset: usize) -> Result<AssetPage, IndexError>;

    /// Number of records currently stored.
    async fn count(&self) -> Result<u64, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_dyn_metadata_index(_: &dyn MetadataIndex) {}
}
