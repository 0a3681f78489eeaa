use std::sync::Arc;

use tracing::info;

use shutter_blob::BlobStore;
use shutter_blob_fs::FsBlobStore;
use shutter_blob_memory::MemoryBlobStore;
use shutter_index::MetadataIndex;
use shutter_index_memory::MemoryMetadataIndex;
#[cfg(feature = "postgres")]
use shutter_index_postgres::{PostgresIndexConfig, PostgresMetadataIndex};
use shutter_service::{AssetService, AssetServiceBuilder};

use crate::config::{BlobConfig, IndexConfig, ShutterConfig};
use crate::error::ServerError;

/// Create a blob store from the given configuration.
///
/// The `fs` backend creates its root directory if needed and removes
/// temporary files left behind by an earlier crash.
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    let store: Arc<dyn BlobStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryBlobStore::new()),
        "fs" => {
            let store = FsBlobStore::open(&config.root)
                .await
                .map_err(|e| ServerError::Config(format!("blob root {}: {e}", config.root)))?;
            let swept = store
                .sweep_temp_files()
                .await
                .map_err(|e| ServerError::Config(format!("blob sweep {}: {e}", config.root)))?;
            if swept > 0 {
                info!(count = swept, root = %config.root, "removed stale temporary blob files");
            }
            Arc::new(store)
        }
        other => {
            return Err(ServerError::Config(format!("unknown blob backend: {other}")));
        }
    };

    Ok(store)
}

/// Create a metadata index from the given configuration.
#[allow(clippy::unused_async)]
pub async fn create_index(config: &IndexConfig) -> Result<Arc<dyn MetadataIndex>, ServerError> {
    let index: Arc<dyn MetadataIndex> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryMetadataIndex::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.resolved_url().ok_or_else(|| {
                ServerError::Config(
                    "postgres index requires [index] url or DATABASE_URL".into(),
                )
            })?;

            let defaults = PostgresIndexConfig::default();
            let pg_config = PostgresIndexConfig {
                url,
                pool_size: config.pool_size.unwrap_or(defaults.pool_size),
                schema: config.schema.clone().unwrap_or(defaults.schema),
                table_prefix: config.table_prefix.clone().unwrap_or(defaults.table_prefix),
                ..PostgresIndexConfig::default()
            };

            let index = PostgresMetadataIndex::new(pg_config)
                .await
                .map_err(|e| ServerError::Config(format!("postgres index: {e}")))?;

            Arc::new(index)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown index backend: {other} (is the feature enabled?)"
            )));
        }
    };

    Ok(index)
}

/// Assemble the asset service from a full server configuration.
pub async fn build_service(config: &ShutterConfig) -> Result<AssetService, ServerError> {
    let blobs = create_blob_store(&config.blob).await?;
    let index = create_index(&config.index).await?;

    info!(
        blob_backend = %config.blob.backend,
        index_backend = %config.index.backend,
        "asset stores initialized"
    );

    Ok(AssetServiceBuilder::new()
        .blobs(blobs)
        .index(index)
        .config(config.assets.clone())
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_backends_are_rejected() {
        let blob = BlobConfig {
            backend: "s3".into(),
            ..BlobConfig::default()
        };
        assert!(matches!(
            create_blob_store(&blob).await,
            Err(ServerError::Config(_))
        ));

        let index = IndexConfig {
            backend: "sqlite".into(),
            ..IndexConfig::default()
        };
        assert!(matches!(
            create_index(&index).await,
            Err(ServerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn fs_backend_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("blobs");
        let blob = BlobConfig {
            backend: "fs".into(),
            root: root.to_string_lossy().into_owned(),
        };

        let store = create_blob_store(&blob).await.unwrap();
        assert!(root.is_dir());
        assert!(!store.exists("anything").await.unwrap());
    }

    #[tokio::test]
    async fn build_service_with_memory_backends() {
        let config: ShutterConfig = toml::from_str(
            r#"
            [blob]
            backend = "memory"
            [assets]
            default_page_size = 5
            "#,
        )
        .unwrap();

        let service = build_service(&config).await.unwrap();
        assert_eq!(service.config().default_page_size, 5);
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn build_service_rejects_inverted_page_sizes() {
        let config: ShutterConfig = toml::from_str(
            r#"
            [blob]
            backend = "memory"
            [assets]
            default_page_size = 500
            max_page_size = 10
            "#,
        )
        .unwrap();

        assert!(matches!(
            build_service(&config).await,
            Err(ServerError::Asset(_))
        ));
    }
}
