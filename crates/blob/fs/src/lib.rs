//! Filesystem [`BlobStore`](shutter_blob::BlobStore) backend.
//!
//! Blobs are stored one file per asset in a sharded directory tree:
//! `{root}/{shard}/{id}`, where `shard` is the last two characters of the id.
//! Writes go to a temporary file in the shard directory and are published
//! with a no-clobber hard link, so readers never see a partial blob and an
//! existing blob is never replaced.

mod store;

pub use store::FsBlobStore;
