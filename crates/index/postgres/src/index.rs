use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use shutter_core::{Asset, AssetPage};
use shutter_index::{IndexError, MetadataIndex};

use crate::config::PostgresIndexConfig;
use crate::migrations;

type AssetRow = (String, DateTime<Utc>, String, String, i64);

const COLUMNS: &str = "id, created_at, filename, mime, size";

/// Build `PgConnectOptions` from a [`PostgresIndexConfig`], applying SSL
/// settings when configured.
pub(crate) fn build_connect_options(
    config: &PostgresIndexConfig,
) -> Result<sqlx::postgres::PgConnectOptions, IndexError> {
    let mut options: sqlx::postgres::PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| IndexError::Unavailable(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => sqlx::postgres::PgSslMode::Disable,
            "prefer" => sqlx::postgres::PgSslMode::Prefer,
            "require" => sqlx::postgres::PgSslMode::Require,
            "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
            "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
            other => {
                return Err(IndexError::Unavailable(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// Classify a `sqlx` error: connectivity problems are `Unavailable`,
/// everything else is a `Backend` failure.
fn map_err(e: sqlx::Error) -> IndexError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => IndexError::Unavailable(e.to_string()),
        other => IndexError::Backend(other.to_string()),
    }
}

fn row_to_asset((id, created_at, filename, mime, size): AssetRow) -> Result<Asset, IndexError> {
    let size = u64::try_from(size)
        .map_err(|_| IndexError::Backend(format!("negative size stored for asset {id}")))?;
    Ok(Asset {
        id,
        created_at,
        filename,
        mime,
        size,
    })
}

/// PostgreSQL-backed implementation of [`MetadataIndex`].
///
/// Uses `sqlx::PgPool` for connection pooling. Listing runs its count and
/// page queries inside one `REPEATABLE READ` read-only transaction so both
/// observe the same snapshot.
pub struct PostgresMetadataIndex {
    pool: PgPool,
    config: Arc<PostgresIndexConfig>,
}

impl PostgresMetadataIndex {
    /// Create a new `PostgresMetadataIndex` from the provided configuration.
    ///
    /// Connects to `PostgreSQL`, creates the connection pool, and runs
    /// migrations to ensure the assets table exists.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] if pool creation fails, or
    /// [`IndexError::Backend`] if migrations fail.
    pub async fn new(config: PostgresIndexConfig) -> Result<Self, IndexError> {
        let connect_options = build_connect_options(&config)?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(connect_options)
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a `PostgresMetadataIndex` from an existing pool and config.
    ///
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresIndexConfig) -> Result<Self, IndexError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl MetadataIndex for PostgresMetadataIndex {
    async fn insert(&self, asset: &Asset) -> Result<(), IndexError> {
        let table = self.config.assets_table();
        let size = i64::try_from(asset.size)
            .map_err(|_| IndexError::Backend(format!("asset too large to index: {}", asset.size)))?;

        let query = format!(
            "INSERT INTO {table} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO NOTHING"
        );

        let result = sqlx::query(&query)
            .bind(&asset.id)
            .bind(asset.created_at)
            .bind(&asset.filename)
            .bind(&asset.mime)
            .bind(size)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        if result.rows_affected() == 0 {
            return Err(IndexError::Conflict(asset.id.clone()));
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Asset, IndexError> {
        let table = self.config.assets_table();
        let query = format!("SELECT {COLUMNS} FROM {table} WHERE id = $1");

        let row: Option<AssetRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        row.map_or_else(|| Err(IndexError::NotFound(id.to_owned())), row_to_asset)
    }

    async fn delete(&self, id: &str) -> Result<Asset, IndexError> {
        let table = self.config.assets_table();
        let query = format!("DELETE FROM {table} WHERE id = $1 RETURNING {COLUMNS}");

        let row: Option<AssetRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        row.map_or_else(|| Err(IndexError::NotFound(id.to_owned())), row_to_asset)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<AssetPage, IndexError> {
        let table = self.config.assets_table();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let mut tx = self.pool.begin().await.map_err(map_err)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        let count_query = format!("SELECT COUNT(*) FROM {table}");
        let (total,): (i64,) = sqlx::query_as(&count_query)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_err)?;

        let page_query = format!(
            "SELECT {COLUMNS} FROM {table} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        let rows: Vec<AssetRow> = sqlx::query_as(&page_query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;

        let items = rows
            .into_iter()
            .map(row_to_asset)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(total, returned = items.len(), "listed assets");

        Ok(AssetPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn count(&self) -> Result<u64, IndexError> {
        let table = self.config.assets_table();
        let query = format!("SELECT COUNT(*) FROM {table}");
        let (total,): (i64,) = sqlx::query_as(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}


#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    fn test_config() -> PostgresIndexConfig {
        PostgresIndexConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/shutter_test".to_string()),
            table_prefix: format!("test_{}_", uuid::Uuid::new_v4().simple()),
            ..PostgresIndexConfig::default()
        }
    }

    #[tokio::test]
    async fn index_conformance() {
        let index = PostgresMetadataIndex::new(test_config())
            .await
            .expect("pool creation should succeed");
        shutter_index::testing::run_index_conformance_tests(&index)
            .await
            .expect("conformance tests should pass");
    }
}
