//! `PostgreSQL` [`MetadataIndex`](shutter_index::MetadataIndex) backend.

pub mod config;
pub mod index;
pub mod migrations;

pub use config::PostgresIndexConfig;
pub use index::PostgresMetadataIndex;
