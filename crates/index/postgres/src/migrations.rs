use sqlx::PgPool;

use crate::config::PostgresIndexConfig;

/// Run database migrations, creating the assets table if it does not exist.
///
/// The listing index matches the `ORDER BY created_at DESC, id DESC` used by
/// paginated listing.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresIndexConfig) -> Result<(), sqlx::Error> {
    let assets_table = config.assets_table();

    let create_assets = format!(
        "CREATE TABLE IF NOT EXISTS {assets_table} (
            id TEXT PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL,
            filename TEXT NOT NULL,
            mime TEXT NOT NULL,
            size BIGINT NOT NULL CHECK (size >= 0)
        )"
    );

    let create_listing_idx = format!(
        "CREATE INDEX IF NOT EXISTS {}assets_listing_idx ON {assets_table} (created_at DESC, id DESC)",
        config.table_prefix
    );

    sqlx::query(&create_assets).execute(pool).await?;
    sqlx::query(&create_listing_idx).execute(pool).await?;

    Ok(())
}
