use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use shutter_blob::{BlobError, BlobStore, BlobStream};
use shutter_core::is_valid_id;

const TEMP_EXTENSION: &str = "tmp";

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store and make sure its root directory exists.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a blob, or `None` if `id` is not a safe key.
    pub fn path_for(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_id(id) {
            return None;
        }
        let shard = id.get(id.len().saturating_sub(2)..).unwrap_or(id);
        Some(self.root.join(shard).join(id))
    }

    /// Remove temporary files left behind by interrupted writes.
    ///
    /// Must not run while writes are in flight: it cannot tell a stale
    /// temporary from one that is being written. Returns the number of files
    /// removed.
    pub async fn sweep_temp_files(&self) -> Result<usize, BlobError> {
        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }

        let mut removed = 0;
        let mut shards = fs::read_dir(&self.root).await?;
        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut entries = fs::read_dir(shard.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == TEMP_EXTENSION) {
                    fs::remove_file(&path).await?;
                    debug!(path = %path.display(), "removed stale temporary blob");
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

fn not_found(id: &str, e: std::io::Error) -> BlobError {
    if e.kind() == ErrorKind::NotFound {
        BlobError::NotFound(id.to_owned())
    } else {
        BlobError::Io(e)
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, id: &str, data: Bytes) -> Result<(), BlobError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| BlobError::InvalidId(id.to_owned()))?;
        let shard_dir = path
            .parent()
            .ok_or_else(|| BlobError::InvalidId(id.to_owned()))?;
        fs::create_dir_all(shard_dir).await?;

        let temp = shard_dir.join(format!(
            "{id}.{}.{TEMP_EXTENSION}",
            uuid::Uuid::new_v4().simple()
        ));

        if let Err(e) = write_synced(&temp, &data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(BlobError::Io(e));
        }

        // hard_link refuses to replace an existing name, unlike rename.
        let published = fs::hard_link(&temp, &path).await;
        if let Err(e) = fs::remove_file(&temp).await {
            warn!(path = %temp.display(), error = %e, "failed to remove temporary blob");
        }

        match published {
            Ok(()) => {
                debug!(id, size = data.len(), "blob written");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(BlobError::AlreadyExists(id.to_owned()))
            }
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    async fn get(&self, id: &str) -> Result<Bytes, BlobError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| BlobError::NotFound(id.to_owned()))?;
        let data = fs::read(&path).await.map_err(|e| not_found(id, e))?;
        Ok(Bytes::from(data))
    }

    async fn open(&self, id: &str) -> Result<BlobStream, BlobError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| BlobError::NotFound(id.to_owned()))?;
        let file = fs::File::open(&path).await.map_err(|e| not_found(id, e))?;
        Ok(ReaderStream::new(file).boxed())
    }

    async fn delete(&self, id: &str) -> Result<(), BlobError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| BlobError::NotFound(id.to_owned()))?;
        fs::remove_file(&path).await.map_err(|e| not_found(id, e))?;
        debug!(id, "blob deleted");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, BlobError> {
        match self.path_for(id) {
            Some(path) => Ok(fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn temp_store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));
        (dir, store)
    }

    async fn temp_files(store: &FsBlobStore) -> usize {
        let mut count = 0;
        let mut shards = fs::read_dir(store.root()).await.unwrap();
        while let Some(shard) = shards.next_entry().await.unwrap() {
            let mut entries = fs::read_dir(shard.path()).await.unwrap();
            while let Some(entry) = entries.next_entry().await.unwrap() {
                if entry.path().extension().is_some_and(|e| e == TEMP_EXTENSION) {
                    count += 1;
                }
            }
        }
        count
    }

    #[tokio::test]
    async fn conformance() {
        let (_dir, store) = temp_store();
        shutter_blob::testing::run_blob_conformance_tests(&store)
            .await
            .unwrap();
    }

    #[test]
    fn path_is_sharded_by_id_suffix() {
        let store = FsBlobStore::new("/data/blobs");
        let path = store
            .path_for("0190f3c2-7d1e-7a4b-9c55-2f4e8a1b3c9d")
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/data/blobs/9d/0190f3c2-7d1e-7a4b-9c55-2f4e8a1b3c9d")
        );
        assert_eq!(store.path_for("x").unwrap(), PathBuf::from("/data/blobs/x/x"));
    }

    #[test]
    fn unsafe_ids_have_no_path() {
        let store = FsBlobStore::new("/data/blobs");
        assert!(store.path_for("../escape").is_none());
        assert!(store.path_for("a/b").is_none());
        assert!(store.path_for("").is_none());
    }

    #[tokio::test]
    async fn put_rejects_unsafe_id() {
        let (_dir, store) = temp_store();
        let err = store
            .put("../escape", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::InvalidId(_)));
        assert!(store.get("../escape").await.unwrap_err().is_not_found());
        assert!(!store.exists("../escape").await.unwrap());
    }

    #[tokio::test]
    async fn put_leaves_no_temporary_files() {
        let (_dir, store) = temp_store();
        store.put("blob-a", Bytes::from_static(b"a")).await.unwrap();
        let _ = store.put("blob-a", Bytes::from_static(b"b")).await;
        assert_eq!(temp_files(&store).await, 0);
        let on_disk = std::fs::read(store.path_for("blob-a").unwrap()).unwrap();
        assert_eq!(on_disk, b"a");
    }

    #[tokio::test]
    async fn sweep_removes_stale_temporaries_only() {
        let (_dir, store) = temp_store();
        store.put("blob-keep", Bytes::from_static(b"keep")).await.unwrap();

        let shard = store.path_for("blob-keep").unwrap();
        let shard = shard.parent().unwrap();
        std::fs::write(shard.join("blob-gone.abc.tmp"), b"partial").unwrap();
        std::fs::write(shard.join("blob-gone.def.tmp"), b"partial").unwrap();

        assert_eq!(store.sweep_temp_files().await.unwrap(), 2);
        assert_eq!(temp_files(&store).await, 0);
        assert_eq!(store.get("blob-keep").await.unwrap().as_ref(), b"keep");
    }

    #[tokio::test]
    async fn sweep_on_missing_root_is_noop() {
        let (_dir, store) = temp_store();
        assert_eq!(store.sweep_temp_files().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn open_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("blobs");
        let store = FsBlobStore::open(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_put_same_id_admits_one_writer() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.put("contended", Bytes::from(vec![i; 4096])).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(BlobError::AlreadyExists(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);

        let data = store.get("contended").await.unwrap();
        assert_eq!(data.len(), 4096);
        assert!(data.iter().all(|b| *b == data[0]), "blob must not be mixed");
    }
}
