use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shutter_core::{Asset, AssetPage};
use shutter_index::{IndexError, MetadataIndex};

/// Sort key yielding newest-first, then id-descending iteration.
type OrderKey = (Reverse<DateTime<Utc>>, Reverse<String>);

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, Asset>,
    order: BTreeSet<OrderKey>,
}

fn order_key(asset: &Asset) -> OrderKey {
    (Reverse(asset.created_at), Reverse(asset.id.clone()))
}

/// Metadata index held in process memory.
///
/// Records and their ordering live behind a single [`RwLock`], so a listing
/// reads `items` and `total` from the same state. The lock is held only while
/// the requested page is copied out.
#[derive(Debug, Default)]
pub struct MemoryMetadataIndex {
    inner: RwLock<Inner>,
}

impl MemoryMetadataIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataIndex for MemoryMetadataIndex {
    async fn insert(&self, asset: &Asset) -> Result<(), IndexError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.contains_key(&asset.id) {
            return Err(IndexError::Conflict(asset.id.clone()));
        }
        inner.order.insert(order_key(asset));
        inner.by_id.insert(asset.id.clone(), asset.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Asset, IndexError> {
        self.inner
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(id.to_owned()))
    }

    async fn delete(&self, id: &str) -> Result<Asset, IndexError> {
        let mut inner = self.inner.write().await;
        let asset = inner
            .by_id
            .remove(id)
            .ok_or_else(|| IndexError::NotFound(id.to_owned()))?;
        inner.order.remove(&order_key(&asset));
        Ok(asset)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<AssetPage, IndexError> {
        let inner = self.inner.read().await;
        let items = inner
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(_, Reverse(id))| inner.by_id.get(id).cloned())
            .collect();
        Ok(AssetPage {
            items,
            total: inner.by_id.len() as u64,
        })
    }

    async fn count(&self) -> Result<u64, IndexError> {
        Ok(self.inner.read().await.by_id.len() as u64)
    }
}
